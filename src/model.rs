use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::taxonomy::{Category, MeasurementUnit};

/// A validated recipe, built by [`crate::validation::validate_recipe`].
///
/// Deserializing a `Recipe` runs the same validation, so stored recipes are
/// held to the rules applied to fresh extractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Recipe {
    pub title: String,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub category: Category,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub difficulty: u8,
    pub servings: Option<u32>,
    #[serde(rename = "yield")]
    pub recipe_yield: Option<String>,
    pub original_link: Option<String>,
    pub video_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub ingredient_name: String,
    pub quantity: f64,
    pub measurement_unit: MeasurementUnit,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub step_number: u32,
    pub description: String,
}

impl TryFrom<Value> for Recipe {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        crate::validation::validate_recipe(&value)
    }
}

impl Recipe {
    /// Render the recipe as plain text, ingredients first.
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&self.title);
        output.push_str("\n\n");

        if let Some(description) = &self.description {
            output.push_str(description);
            output.push_str("\n\n");
        }

        for ingredient in &self.ingredients {
            output.push_str(&format!(
                "- {} {} {}",
                format_quantity(ingredient.quantity),
                ingredient.measurement_unit,
                ingredient.ingredient_name
            ));
            if let Some(notes) = &ingredient.notes {
                output.push_str(&format!(", {notes}"));
            }
            output.push('\n');
        }

        if !self.ingredients.is_empty() {
            output.push('\n');
        }

        for step in &self.instructions {
            output.push_str(&format!("{}. {}\n", step.step_number, step.description));
        }

        output.trim_end().to_string()
    }
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}
