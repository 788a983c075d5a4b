//! Validation and coercion of extraction-service output into a [`Recipe`].
//!
//! The service is asked for schema-conforming JSON but answers are not
//! trusted. Values are coerced where a single unambiguous reading exists and
//! rejected otherwise; nothing is ever half-applied.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::ingredient_parser::parse_quantity_text;
use crate::model::{Ingredient, Instruction, Recipe};
use crate::taxonomy::{Category, MeasurementUnit};

/// Turn a service response into a validated [`Recipe`].
pub fn validate_recipe(value: &Value) -> Result<Recipe, ValidationError> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject(json_type(value).to_string()))?;

    let title = optional_text(object, "title")?
        .ok_or_else(|| ValidationError::MissingField("title".to_string()))?;

    let category = match object.get("category") {
        Some(Value::String(raw)) => Category::coerce(raw),
        _ => Category::Other,
    };

    let ingredients = match object.get("ingredients") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| validate_ingredient(index, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::Null) | None => {
            return Err(ValidationError::MissingField("ingredients".to_string()))
        }
        Some(other) => {
            return Err(ValidationError::InvalidField {
                field: "ingredients".to_string(),
                reason: format!("expected a list, got {}", json_type(other)),
            })
        }
    };

    let instructions = match object.get("instructions") {
        Some(Value::Array(items)) => validate_instructions(items)?,
        Some(Value::Null) | None => {
            return Err(ValidationError::MissingField("instructions".to_string()))
        }
        Some(other) => {
            return Err(ValidationError::InvalidField {
                field: "instructions".to_string(),
                reason: format!("expected a list, got {}", json_type(other)),
            })
        }
    };

    let difficulty = match object.get("difficulty") {
        Some(Value::Null) | None => estimate_difficulty(ingredients.len(), instructions.len()),
        Some(value) => {
            let raw = as_number(value).ok_or_else(|| ValidationError::InvalidField {
                field: "difficulty".to_string(),
                reason: format!("expected a number from 1 to 5, got {value}"),
            })?;
            raw.round().clamp(1.0, 5.0) as u8
        }
    };

    let recipe_yield = match optional_text(object, "yield")? {
        Some(value) => Some(value),
        None => optional_text(object, "yeild")?,
    };

    Ok(Recipe {
        title,
        description: optional_text(object, "description")?,
        photo: optional_text(object, "photo")?,
        category,
        ingredients,
        instructions,
        prep_time: optional_text(object, "prep_time")?,
        cook_time: optional_text(object, "cook_time")?,
        difficulty,
        servings: servings(object.get("servings")),
        recipe_yield,
        original_link: optional_text(object, "original_link")?,
        video_link: optional_text(object, "video_link")?,
    })
}

/// Deterministic difficulty estimate for recipes that don't state one.
pub fn estimate_difficulty(ingredient_count: usize, step_count: usize) -> u8 {
    match ingredient_count + 2 * step_count {
        0..=8 => 1,
        9..=16 => 2,
        17..=26 => 3,
        27..=38 => 4,
        _ => 5,
    }
}

fn validate_ingredient(index: usize, item: &Value) -> Result<Ingredient, ValidationError> {
    let field = format!("ingredients[{index}]");
    let object = item.as_object().ok_or_else(|| ValidationError::InvalidField {
        field: field.clone(),
        reason: format!("expected an object, got {}", json_type(item)),
    })?;

    let name = optional_text(object, "ingredient_name")?
        .or(optional_text(object, "name")?)
        .ok_or_else(|| ValidationError::MissingField(format!("{field}.ingredient_name")))?;

    let (quantity, unit_from_quantity) = match object.get("quantity") {
        Some(Value::Number(number)) => (number.as_f64().unwrap_or_default(), None),
        Some(Value::String(text)) => {
            parse_quantity_text(text).ok_or_else(|| ValidationError::InvalidQuantity {
                ingredient: name.clone(),
                quantity: text.clone(),
            })?
        }
        Some(Value::Null) | None => {
            return Err(ValidationError::MissingField(format!("{field}.quantity")))
        }
        Some(other) => {
            return Err(ValidationError::InvalidQuantity {
                ingredient: name,
                quantity: other.to_string(),
            })
        }
    };

    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ValidationError::InvalidQuantity {
            ingredient: name,
            quantity: quantity.to_string(),
        });
    }

    let stated_unit = optional_text(object, "measurement_unit")?
        .or(optional_text(object, "unit")?);

    let measurement_unit = match stated_unit {
        Some(raw) => match MeasurementUnit::parse(&raw) {
            // "2 tablespoons" in quantity wins over a defaulted "whole"
            Some(MeasurementUnit::Whole) => unit_from_quantity.unwrap_or(MeasurementUnit::Whole),
            Some(unit) => unit,
            None => {
                return Err(ValidationError::InvalidUnit {
                    ingredient: name,
                    unit: raw,
                })
            }
        },
        None => unit_from_quantity.unwrap_or(MeasurementUnit::Whole),
    };

    Ok(Ingredient {
        ingredient_name: name,
        quantity,
        measurement_unit,
        notes: optional_text(object, "notes")?,
    })
}

fn validate_instructions(items: &[Value]) -> Result<Vec<Instruction>, ValidationError> {
    let mut steps = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let (number, description) = match item {
            // Bare strings are numbered by position
            Value::String(text) => (index as u64 + 1, text.trim().to_string()),
            Value::Object(object) => {
                let number = match object.get("step_number") {
                    Some(value) => as_number(value)
                        .filter(|n| n.fract() == 0.0 && *n >= 1.0)
                        .ok_or_else(|| ValidationError::InvalidStep {
                            index,
                            reason: format!("`{value}` is not a positive integer"),
                        })? as u64,
                    None => {
                        return Err(ValidationError::InvalidStep {
                            index,
                            reason: "step_number is missing".to_string(),
                        })
                    }
                };
                let description = optional_text(object, "description")?.unwrap_or_default();
                (number, description)
            }
            other => {
                return Err(ValidationError::InvalidStep {
                    index,
                    reason: format!("expected an object, got {}", json_type(other)),
                })
            }
        };

        if description.is_empty() {
            return Err(ValidationError::InvalidStep {
                index,
                reason: "description is empty".to_string(),
            });
        }

        steps.push((number, description));
    }

    // Stable: ties keep the order the service gave them
    steps.sort_by_key(|(number, _)| *number);

    Ok(steps
        .into_iter()
        .enumerate()
        .map(|(position, (_, description))| Instruction {
            step_number: position as u32 + 1,
            description,
        })
        .collect())
}

fn optional_text(object: &Map<String, Value>, key: &str) -> Result<Option<String>, ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(ValidationError::InvalidField {
            field: key.to_string(),
            reason: format!("expected text, got {}", json_type(other)),
        }),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn servings(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(number) => number
            .as_f64()
            .filter(|n| *n >= 1.0)
            .map(|n| n.round() as u32),
        Value::String(text) => {
            let digits: String = text
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<u32>().ok().filter(|n| *n >= 1)
        }
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "title": "Pancakes",
            "category": "Breakfast",
            "ingredients": [
                {"ingredient_name": "flour", "quantity": 1.5, "measurement_unit": "cup", "notes": null}
            ],
            "instructions": [
                {"step_number": 1, "description": "Mix."},
                {"step_number": 2, "description": "Fry."}
            ],
            "difficulty": 2
        })
    }

    #[test]
    fn test_valid_recipe() {
        let recipe = validate_recipe(&minimal()).unwrap();
        assert_eq!(recipe.title, "Pancakes");
        assert_eq!(recipe.category, Category::Breakfast);
        assert_eq!(recipe.ingredients[0].measurement_unit, MeasurementUnit::Cup);
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.difficulty, 2);
        assert_eq!(recipe.servings, None);
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("title");
        assert_eq!(
            validate_recipe(&value),
            Err(ValidationError::MissingField("title".to_string()))
        );

        value["title"] = json!("   ");
        assert!(validate_recipe(&value).is_err());
    }

    #[test]
    fn test_unknown_category_becomes_other() {
        let mut value = minimal();
        value["category"] = json!("Main Course");
        assert_eq!(validate_recipe(&value).unwrap().category, Category::Other);

        value.as_object_mut().unwrap().remove("category");
        assert_eq!(validate_recipe(&value).unwrap().category, Category::Other);
    }

    #[test]
    fn test_quantity_text_is_coerced() {
        let mut value = minimal();
        value["ingredients"] = json!([
            {"ingredient_name": "shallots", "quantity": "2 tablespoons", "measurement_unit": null},
            {"ingredient_name": "salt", "quantity": "1/2", "measurement_unit": "teaspoons"},
            {"ingredient_name": "bell peppers", "quantity": 3, "notes": "diced"}
        ]);

        let recipe = validate_recipe(&value).unwrap();
        assert_eq!(recipe.ingredients[0].quantity, 2.0);
        assert_eq!(recipe.ingredients[0].measurement_unit, MeasurementUnit::Tbsp);
        assert_eq!(recipe.ingredients[1].quantity, 0.5);
        assert_eq!(recipe.ingredients[1].measurement_unit, MeasurementUnit::Tsp);
        assert_eq!(recipe.ingredients[2].measurement_unit, MeasurementUnit::Whole);
        assert_eq!(recipe.ingredients[2].notes.as_deref(), Some("diced"));
    }

    #[test]
    fn test_non_numeric_quantity_is_rejected() {
        let mut value = minimal();
        value["ingredients"] = json!([
            {"ingredient_name": "salt", "quantity": "to taste", "measurement_unit": "pinch"}
        ]);
        assert!(matches!(
            validate_recipe(&value),
            Err(ValidationError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        let mut value = minimal();
        value["ingredients"] = json!([
            {"ingredient_name": "spinach", "quantity": 1, "measurement_unit": "handful"}
        ]);
        assert!(matches!(
            validate_recipe(&value),
            Err(ValidationError::InvalidUnit { .. })
        ));
    }

    #[test]
    fn test_missing_lists_are_rejected_but_empty_lists_pass() {
        let mut value = minimal();
        value["ingredients"] = Value::Null;
        assert_eq!(
            validate_recipe(&value),
            Err(ValidationError::MissingField("ingredients".to_string()))
        );

        value["ingredients"] = json!([]);
        value["instructions"] = json!([]);
        let recipe = validate_recipe(&value).unwrap();
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_steps_are_renumbered_in_order() {
        let mut value = minimal();
        value["instructions"] = json!([
            {"step_number": 3, "description": "Serve."},
            {"step_number": 1, "description": "Mix."},
            {"step_number": 1, "description": "Rest."},
            {"step_number": 7, "description": "Eat."}
        ]);

        let recipe = validate_recipe(&value).unwrap();
        let described: Vec<(u32, &str)> = recipe
            .instructions
            .iter()
            .map(|s| (s.step_number, s.description.as_str()))
            .collect();
        assert_eq!(
            described,
            vec![(1, "Mix."), (2, "Rest."), (3, "Serve."), (4, "Eat.")]
        );
    }

    #[test]
    fn test_unrepairable_steps_are_rejected() {
        let mut value = minimal();
        value["instructions"] = json!([
            {"step_number": 1, "description": "Mix."},
            {"description": "Fry."}
        ]);
        assert!(matches!(
            validate_recipe(&value),
            Err(ValidationError::InvalidStep { index: 1, .. })
        ));

        value["instructions"] = json!([{"step_number": 0, "description": "Mix."}]);
        assert!(validate_recipe(&value).is_err());
    }

    #[test]
    fn test_string_steps_are_numbered_by_position() {
        let mut value = minimal();
        value["instructions"] = json!(["Mix.", "Fry."]);
        let recipe = validate_recipe(&value).unwrap();
        assert_eq!(recipe.instructions[1].step_number, 2);
        assert_eq!(recipe.instructions[1].description, "Fry.");
    }

    #[test]
    fn test_difficulty_clamped_and_estimated() {
        let mut value = minimal();
        value["difficulty"] = json!(9);
        assert_eq!(validate_recipe(&value).unwrap().difficulty, 5);

        value["difficulty"] = Value::Null;
        assert_eq!(validate_recipe(&value).unwrap().difficulty, 1);

        value["difficulty"] = json!("hard");
        assert!(validate_recipe(&value).is_err());
    }

    #[test]
    fn test_servings_and_yield() {
        let mut value = minimal();
        value["servings"] = json!("4 servings");
        value["yeild"] = json!("12 pancakes");
        let recipe = validate_recipe(&value).unwrap();
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.recipe_yield.as_deref(), Some("12 pancakes"));
    }

    #[test]
    fn test_estimate_difficulty_is_monotonic() {
        assert_eq!(estimate_difficulty(0, 0), 1);
        assert!(estimate_difficulty(10, 10) >= estimate_difficulty(5, 3));
        assert_eq!(estimate_difficulty(30, 20), 5);
    }
}
