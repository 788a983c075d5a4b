//! Offline extractor that reads recipes laid out with conventional headings.
//!
//! It needs no service and always gives the same answer for the same content,
//! which makes it useful for tests and as a last resort when no API key is
//! configured. Content without recognizable ingredients or steps is refused.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ExtractionError;
use crate::ingredient_parser::{parse_ingredient_line, parse_leading_quantity};
use crate::providers::{ExtractionRequest, ServiceResponse, StructuredExtractor};
use crate::taxonomy::Category;
use crate::url_to_text::NormalizedContent;

const INGREDIENT_HEADINGS: &[&str] = &[
    "ingredients",
    "ingredient list",
    "you will need",
    "you'll need",
    "what you need",
];

const INSTRUCTION_HEADINGS: &[&str] = &[
    "instructions",
    "directions",
    "method",
    "steps",
    "preparation",
    "how to make it",
    "how to make",
];

/// Title keywords per category, checked in order.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::CupcakesAndMuffins, &["cupcake", "cupcakes", "muffin", "muffins"]),
    (Category::FrostingsAndToppings, &["frosting", "icing", "glaze", "topping"]),
    (Category::IceCream, &["ice cream", "gelato", "sorbet"]),
    (Category::Cakes, &["cake", "cheesecake"]),
    (Category::Cookies, &["cookie", "cookies", "biscotti", "brownies"]),
    (Category::Pies, &["pie", "tart", "galette"]),
    (Category::Candies, &["candy", "fudge", "toffee", "truffles", "caramels"]),
    (Category::Soups, &["soup", "stew", "chowder", "bisque", "chili"]),
    (Category::Salads, &["salad", "slaw"]),
    (Category::SaucesAndDressings, &["sauce", "dressing", "vinaigrette", "pesto", "gravy"]),
    (Category::Beverages, &["smoothie", "cocktail", "lemonade", "latte", "tea", "punch"]),
    (Category::Breakfast, &["pancake", "pancakes", "waffle", "waffles", "omelet", "omelette", "granola", "frittata"]),
    (Category::BakedGoods, &["bread", "rolls", "scones", "biscuits", "focaccia", "bagels"]),
    (Category::Seafood, &["shrimp", "salmon", "fish", "tuna", "cod", "scallops", "crab", "lobster"]),
    (Category::Poultry, &["chicken", "turkey", "duck"]),
    (Category::Meat, &["beef", "pork", "lamb", "steak", "sausage", "meatballs", "bacon"]),
    (Category::Appetizers, &["dip", "bruschetta", "crostini", "appetizer", "sliders"]),
    (Category::Snacks, &["snack", "popcorn", "trail mix", "energy balls"]),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Ingredients,
    Instructions,
}

#[derive(Debug, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build a schema-shaped object from content, or `None` when no recipe is
    /// recognizable.
    pub fn extract_value(&self, content: &NormalizedContent) -> Option<Value> {
        let lines: Vec<&str> = content
            .text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut section = Section::Preamble;
        let mut preamble = Vec::new();
        let mut ingredient_lines = Vec::new();
        let mut instruction_lines = Vec::new();

        for line in &lines {
            if let Some(next) = heading(line) {
                section = next;
                continue;
            }
            if is_boilerplate(line) {
                continue;
            }
            match section {
                Section::Preamble => preamble.push(*line),
                Section::Ingredients => ingredient_lines.push(*line),
                Section::Instructions => instruction_lines.push(*line),
            }
        }

        // No headings: quantity-led lines are ingredients, numbered lines are steps
        if ingredient_lines.is_empty() && instruction_lines.is_empty() {
            for line in &preamble {
                if strip_step_number(line).is_some() {
                    instruction_lines.push(*line);
                } else if parse_leading_quantity(line).is_some_and(|q| q.unit.is_some()) {
                    ingredient_lines.push(*line);
                }
            }
        }

        if ingredient_lines.is_empty() && instruction_lines.is_empty() {
            return None;
        }

        let title = preamble
            .iter()
            .find(|line| !is_metadata_line(line))
            .map(|line| line.to_string())
            .unwrap_or_else(|| "Untitled Recipe".to_string());

        let ingredients: Vec<Value> = ingredient_lines
            .iter()
            .filter(|line| !is_metadata_line(line))
            .filter_map(|line| parse_ingredient_line(line))
            .map(|ingredient| serde_json::to_value(ingredient).unwrap_or(Value::Null))
            .collect();

        let instructions: Vec<Value> = instruction_lines
            .iter()
            .filter(|line| !is_metadata_line(line))
            .map(|line| strip_step_number(line).unwrap_or(*line))
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(index, description)| {
                json!({"step_number": index + 1, "description": description})
            })
            .collect();

        Some(json!({
            "title": title,
            "description": null,
            "photo": content.media_urls.first(),
            "category": guess_category(&title).label(),
            "ingredients": ingredients,
            "instructions": instructions,
            "prep_time": labelled_value(&lines, &["prep time", "preparation time"]),
            "cook_time": labelled_value(&lines, &["cook time", "cooking time", "bake time"]),
            "difficulty": null,
            "servings": labelled_value(&lines, &["servings", "serves", "yield"])
                .and_then(|v| v.split_whitespace().next().and_then(|n| n.parse::<u32>().ok())),
            "yield": labelled_value(&lines, &["makes", "yield"]),
            "original_link": content.source_url,
            "video_link": null,
        }))
    }
}

#[async_trait]
impl StructuredExtractor for RuleBasedExtractor {
    fn provider_name(&self) -> &str {
        "rule_based"
    }

    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<ServiceResponse, ExtractionError> {
        Ok(match self.extract_value(request.content) {
            Some(value) => ServiceResponse::Parsed(value),
            None => ServiceResponse::Refusal(
                "No ingredients or instructions found in content".to_string(),
            ),
        })
    }
}

fn heading(line: &str) -> Option<Section> {
    let normalized = line
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase();
    if INGREDIENT_HEADINGS.contains(&normalized.as_str()) {
        Some(Section::Ingredients)
    } else if INSTRUCTION_HEADINGS.contains(&normalized.as_str()) {
        Some(Section::Instructions)
    } else {
        None
    }
}

fn is_boilerplate(line: &str) -> bool {
    line.starts_with("http://")
        || line.starts_with("https://")
        || line.starts_with("Instagram post by @")
        || (line.starts_with("Comments from @") && line.ends_with(':'))
}

fn is_metadata_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    ["prep time", "cook time", "cooking time", "total time", "servings", "serves", "yield", "makes"]
        .iter()
        .any(|label| lower.starts_with(label))
}

/// `"1. Mix"`, `"2) Bake"`, `"Step 3: Serve"` -> the text after the number.
fn strip_step_number(line: &str) -> Option<&str> {
    let line = line.trim();
    let rest = line
        .strip_prefix("Step ")
        .or_else(|| line.strip_prefix("step "))
        .unwrap_or(line);
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let after = &rest[digits..];
    let after = after
        .strip_prefix('.')
        .or_else(|| after.strip_prefix(')'))
        .or_else(|| after.strip_prefix(':'))?;
    Some(after.trim())
}

/// Value after `label:` on the first line starting with one of the labels.
fn labelled_value(lines: &[&str], labels: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        let lower = line.to_lowercase();
        let label = labels.iter().find(|label| lower.starts_with(*label))?;
        let rest = line.get(label.len()..)?.trim_start_matches([':', ' ', '-']).trim();
        (!rest.is_empty()).then(|| rest.to_string())
    })
}

fn guess_category(title: &str) -> Category {
    let lower = format!(" {} ", title.to_lowercase());
    let padded: String = lower
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| padded.contains(&format!(" {keyword} ")))
        })
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_to_text::SourceKind;

    fn content(text: &str) -> NormalizedContent {
        NormalizedContent {
            source_url: "https://example.com/soup".to_string(),
            source: SourceKind::GenericPage,
            text: text.to_string(),
            media_urls: vec!["https://cdn.example.com/soup.jpg".to_string()],
        }
    }

    const SOUP: &str = "Roasted Tomato Soup\n\
        Prep time: 10 minutes\n\
        Serves 4\n\
        Ingredients\n\
        2 tablespoons olive oil\n\
        3 bell peppers, diced\n\
        1/2 teaspoon salt\n\
        Instructions\n\
        1. Roast the vegetables.\n\
        2. Blend until smooth.";

    #[test]
    fn test_extracts_sections() {
        let value = RuleBasedExtractor::new().extract_value(&content(SOUP)).unwrap();
        assert_eq!(value["title"], "Roasted Tomato Soup");
        assert_eq!(value["category"], "Soups");
        assert_eq!(value["ingredients"].as_array().unwrap().len(), 3);
        assert_eq!(value["ingredients"][0]["measurement_unit"], "Tbsp");
        assert_eq!(value["ingredients"][1]["measurement_unit"], "whole");
        assert_eq!(value["ingredients"][2]["quantity"], 0.5);
        assert_eq!(value["instructions"][1]["description"], "Blend until smooth.");
        assert_eq!(value["instructions"][1]["step_number"], 2);
        assert_eq!(value["prep_time"], "10 minutes");
        assert_eq!(value["servings"], 4);
        assert_eq!(value["photo"], "https://cdn.example.com/soup.jpg");
        assert_eq!(value["original_link"], "https://example.com/soup");
    }

    #[test]
    fn test_without_headings() {
        let text = "Garlic butter\n2 tablespoons butter\n3 cloves garlic\n1. Melt butter\n2. Add garlic";
        let value = RuleBasedExtractor::new().extract_value(&content(text)).unwrap();
        assert_eq!(value["ingredients"].as_array().unwrap().len(), 2);
        assert_eq!(value["instructions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_non_recipe_is_none() {
        let text = "About us\nWe are a small team of writers.";
        assert!(RuleBasedExtractor::new().extract_value(&content(text)).is_none());
    }

    #[test]
    fn test_same_content_same_answer() {
        let extractor = RuleBasedExtractor::new();
        assert_eq!(
            extractor.extract_value(&content(SOUP)),
            extractor.extract_value(&content(SOUP))
        );
    }

    #[test]
    fn test_strip_step_number() {
        assert_eq!(strip_step_number("1. Mix"), Some("Mix"));
        assert_eq!(strip_step_number("2) Bake"), Some("Bake"));
        assert_eq!(strip_step_number("Step 3: Serve"), Some("Serve"));
        assert_eq!(strip_step_number("2 cups flour"), None);
    }

    #[test]
    fn test_guess_category() {
        assert_eq!(guess_category("Easy Brooklyn Blackout Cake"), Category::Cakes);
        assert_eq!(guess_category("Lemon Chicken"), Category::Poultry);
        assert_eq!(guess_category("Chocolate Cupcakes"), Category::CupcakesAndMuffins);
        assert_eq!(guess_category("Mystery dish"), Category::Other);
    }
}
