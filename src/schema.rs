//! Field-level description of the [`Recipe`](crate::model::Recipe) record.
//!
//! The same description drives both the natural-language instruction set sent
//! to an extraction service and the JSON Schema used by providers that support
//! schema-constrained output, so enum values and coercion rules can't drift
//! between the two.

use serde_json::{json, Map, Value};

use crate::taxonomy::{Category, MeasurementUnit};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Integer { min: Option<i64>, max: Option<i64> },
    Enum(Vec<&'static str>),
    List(Vec<FieldSpec>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub rules: Vec<&'static str>,
}

impl FieldSpec {
    fn new(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            rules: Vec::new(),
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn rule(mut self, rule: &'static str) -> Self {
        self.rules.push(rule);
        self
    }
}

/// How forcefully the instruction set states its constraints.
///
/// `Strict` is used when a previous response failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    #[default]
    Normal,
    Strict,
}

const STRICT_RULES: &[&str] = &[
    "Return every field listed above. Use null for optional fields you cannot find, never omit a key.",
    "title must be a non-empty string.",
    "quantity must be a JSON number (0.5, not \"1/2\" and not \"2 cups\").",
    "measurement_unit and category must be copied exactly from their allowed values.",
    "step_number must start at 1 and increase by 1 for each step, with no repeats.",
];

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSchema {
    pub fields: Vec<FieldSpec>,
}

impl Default for RecipeSchema {
    fn default() -> Self {
        Self::recipe()
    }
}

impl RecipeSchema {
    /// The canonical recipe schema.
    pub fn recipe() -> Self {
        let ingredient = vec![
            FieldSpec::new("ingredient_name", "Ingredient name", FieldKind::Text).required(),
            FieldSpec::new("quantity", "Amount as a number", FieldKind::Number)
                .required()
                .rule("Separate quantity and unit: \"2 tablespoons\" is quantity 2 with unit Tbsp.")
                .rule("Convert fractions to decimals: 1/2 is 0.5, 1 1/2 is 1.5."),
            FieldSpec::new(
                "measurement_unit",
                "Unit of measure",
                FieldKind::Enum(MeasurementUnit::labels()),
            )
            .required()
            .rule("Countable items without a unit (\"3 bell peppers\") use whole."),
            FieldSpec::new(
                "notes",
                "Preparation notes such as diced or softened",
                FieldKind::Text,
            ),
        ];

        let instruction = vec![
            FieldSpec::new(
                "step_number",
                "Step number",
                FieldKind::Integer {
                    min: Some(1),
                    max: None,
                },
            )
            .required(),
            FieldSpec::new("description", "What to do in this step", FieldKind::Text).required(),
        ];

        let fields = vec![
            FieldSpec::new("title", "Recipe title", FieldKind::Text).required(),
            FieldSpec::new("description", "Short descriptive text", FieldKind::Text),
            FieldSpec::new("photo", "URL of the recipe photo", FieldKind::Text)
                .rule("Prefer a URL from the media list or an og:image style URL found in the content."),
            FieldSpec::new("category", "Category", FieldKind::Enum(Category::labels()))
                .required()
                .rule("Use Other when no category fits."),
            FieldSpec::new("ingredients", "Ingredients", FieldKind::List(ingredient))
                .required()
                .rule("Keep the order used by the recipe. Return an empty list only if the recipe has no ingredients."),
            FieldSpec::new("instructions", "Instructions", FieldKind::List(instruction))
                .required()
                .rule("One entry per step, in cooking order."),
            FieldSpec::new("prep_time", "Prep time", FieldKind::Text),
            FieldSpec::new("cook_time", "Cook time", FieldKind::Text),
            FieldSpec::new(
                "difficulty",
                "Difficulty",
                FieldKind::Integer {
                    min: Some(1),
                    max: Some(5),
                },
            )
            .required()
            .rule("Scale from 1-5. Predict the difficulty if the recipe does not state one."),
            FieldSpec::new(
                "servings",
                "Number of servings",
                FieldKind::Integer {
                    min: Some(1),
                    max: None,
                },
            ),
            FieldSpec::new("yield", "Yield, e.g. 24 cookies", FieldKind::Text),
            FieldSpec::new("original_link", "Link to original recipe", FieldKind::Text),
            FieldSpec::new("video_link", "Link to video", FieldKind::Text),
        ];

        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build the instruction set handed to the extraction service.
    pub fn instructions(&self, strictness: Strictness) -> String {
        let mut prompt = String::from(
            "Extract a single recipe from the content below. \
             Respond with one JSON object using exactly these keys.\n\n",
        );

        for field in &self.fields {
            describe_field(&mut prompt, field, 0);
        }

        prompt.push_str(
            "\nIf the content does not contain a recipe, refuse instead of inventing one.",
        );

        if strictness == Strictness::Strict {
            prompt.push_str("\n\nThe previous answer was rejected. Follow these rules exactly:\n");
            for rule in STRICT_RULES {
                prompt.push_str("- ");
                prompt.push_str(rule);
                prompt.push('\n');
            }
        }

        prompt
    }

    /// JSON Schema for the record, in the strict subset accepted by
    /// structured-output APIs (all keys required, optional ones nullable).
    pub fn json_schema(&self) -> Value {
        object_schema(&self.fields)
    }
}

fn describe_field(prompt: &mut String, field: &FieldSpec, depth: usize) {
    let indent = "  ".repeat(depth);
    let requirement = if field.required {
        "required"
    } else {
        "optional"
    };

    match &field.kind {
        FieldKind::Text => prompt.push_str(&format!(
            "{indent}- {} ({requirement}, text): {}",
            field.name, field.description
        )),
        FieldKind::Number => prompt.push_str(&format!(
            "{indent}- {} ({requirement}, number): {}",
            field.name, field.description
        )),
        FieldKind::Integer { min, max } => {
            let range = match (min, max) {
                (Some(min), Some(max)) => format!(" from {min} to {max}"),
                (Some(min), None) => format!(" of at least {min}"),
                _ => String::new(),
            };
            prompt.push_str(&format!(
                "{indent}- {} ({requirement}, integer{range}): {}",
                field.name, field.description
            ))
        }
        FieldKind::Enum(values) => prompt.push_str(&format!(
            "{indent}- {} ({requirement}, one of the following: {}): {}",
            field.name,
            values.join(", "),
            field.description
        )),
        FieldKind::List(sub_fields) => {
            prompt.push_str(&format!(
                "{indent}- {} ({requirement}, list of objects): {}",
                field.name, field.description
            ));
            for rule in &field.rules {
                prompt.push_str(&format!(". {rule}"));
            }
            prompt.push('\n');
            for sub_field in sub_fields {
                describe_field(prompt, sub_field, depth + 1);
            }
            return;
        }
    }

    for rule in &field.rules {
        prompt.push_str(&format!(". {rule}"));
    }
    prompt.push('\n');
}

fn object_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(field.name.to_string(), field_schema(field));
    }
    let required: Vec<&str> = fields.iter().map(|f| f.name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn field_schema(field: &FieldSpec) -> Value {
    let base_type = match &field.kind {
        FieldKind::Text => "string",
        FieldKind::Number => "number",
        FieldKind::Integer { .. } => "integer",
        FieldKind::Enum(_) => "string",
        FieldKind::List(_) => "array",
    };

    let mut schema = match &field.kind {
        FieldKind::Enum(values) => json!({ "type": base_type, "enum": values }),
        FieldKind::List(sub_fields) => json!({
            "type": base_type,
            "items": object_schema(sub_fields),
        }),
        _ => json!({ "type": base_type }),
    };

    if !field.required {
        schema["type"] = json!([base_type, "null"]);
    }
    schema["description"] = json!(field.description);
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_embed_enums_and_rules() {
        let prompt = RecipeSchema::recipe().instructions(Strictness::Normal);
        assert!(prompt.contains("Cupcakes & Muffins"));
        assert!(prompt.contains("Tbsp"));
        assert!(prompt.contains("fl oz"));
        assert!(prompt.contains("use whole"));
        assert!(prompt.contains("Predict the difficulty"));
        assert!(prompt.contains("  - step_number"));
        assert!(!prompt.contains("previous answer was rejected"));
    }

    #[test]
    fn test_strict_instructions_add_rules() {
        let schema = RecipeSchema::recipe();
        let strict = schema.instructions(Strictness::Strict);
        assert!(strict.starts_with(&schema.instructions(Strictness::Normal)));
        assert!(strict.contains("quantity must be a JSON number"));
    }

    #[test]
    fn test_json_schema_shape() {
        let schema = RecipeSchema::recipe().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["properties"]["title"]["type"], "string");
        assert_eq!(schema["properties"]["photo"]["type"], json!(["string", "null"]));
        assert_eq!(
            schema["properties"]["ingredients"]["items"]["properties"]["measurement_unit"]["enum"]
                .as_array()
                .unwrap()
                .len(),
            MeasurementUnit::ALL.len()
        );
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("yield")));
    }
}
