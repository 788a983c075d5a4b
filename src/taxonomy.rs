//! Closed vocabularies shared by the recipe schema: measurement units and
//! recipe categories.
//!
//! Both enums serialize to their canonical label (`"Tbsp"`, `"Baked Goods"`)
//! and parse leniently from the spellings found in recipe text.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Measurement unit attached to an ingredient quantity.
///
/// Canonical spellings are singular. Countable items without a unit use
/// [`MeasurementUnit::Whole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeasurementUnit {
    Clove,
    Cup,
    FlOz,
    Gallon,
    Gram,
    Head,
    Lb,
    Ml,
    Oz,
    Piece,
    Pinch,
    Pint,
    Quart,
    Sprig,
    Tbsp,
    Tsp,
    #[default]
    Whole,
}

impl MeasurementUnit {
    pub const ALL: [MeasurementUnit; 17] = [
        MeasurementUnit::Clove,
        MeasurementUnit::Cup,
        MeasurementUnit::FlOz,
        MeasurementUnit::Gallon,
        MeasurementUnit::Gram,
        MeasurementUnit::Head,
        MeasurementUnit::Lb,
        MeasurementUnit::Ml,
        MeasurementUnit::Oz,
        MeasurementUnit::Piece,
        MeasurementUnit::Pinch,
        MeasurementUnit::Pint,
        MeasurementUnit::Quart,
        MeasurementUnit::Sprig,
        MeasurementUnit::Tbsp,
        MeasurementUnit::Tsp,
        MeasurementUnit::Whole,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MeasurementUnit::Clove => "clove",
            MeasurementUnit::Cup => "cup",
            MeasurementUnit::FlOz => "fl oz",
            MeasurementUnit::Gallon => "gallon",
            MeasurementUnit::Gram => "gram",
            MeasurementUnit::Head => "head",
            MeasurementUnit::Lb => "lb",
            MeasurementUnit::Ml => "ml",
            MeasurementUnit::Oz => "oz",
            MeasurementUnit::Piece => "piece",
            MeasurementUnit::Pinch => "pinch",
            MeasurementUnit::Pint => "pint",
            MeasurementUnit::Quart => "quart",
            MeasurementUnit::Sprig => "sprig",
            MeasurementUnit::Tbsp => "Tbsp",
            MeasurementUnit::Tsp => "tsp",
            MeasurementUnit::Whole => "whole",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|u| u.label()).collect()
    }

    /// Parse a unit spelling, including plurals and common abbreviations.
    ///
    /// Case matters only for the single-letter forms: `T` is a tablespoon and
    /// `t` a teaspoon, as in handwritten recipes.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_end_matches('.');
        match trimmed {
            "T" | "Tb" | "TB" => return Some(MeasurementUnit::Tbsp),
            "t" => return Some(MeasurementUnit::Tsp),
            _ => {}
        }

        let lower = trimmed.to_lowercase();
        let unit = match lower.as_str() {
            "clove" | "cloves" => MeasurementUnit::Clove,
            "cup" | "cups" | "c" => MeasurementUnit::Cup,
            "fl oz" | "fl. oz" | "fl.oz" | "floz" | "fluid ounce" | "fluid ounces" => {
                MeasurementUnit::FlOz
            }
            "gallon" | "gallons" | "gal" => MeasurementUnit::Gallon,
            "gram" | "grams" | "g" | "gr" | "gm" => MeasurementUnit::Gram,
            "head" | "heads" => MeasurementUnit::Head,
            "lb" | "lbs" | "pound" | "pounds" => MeasurementUnit::Lb,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                MeasurementUnit::Ml
            }
            "oz" | "ounce" | "ounces" => MeasurementUnit::Oz,
            "piece" | "pieces" | "pc" | "pcs" => MeasurementUnit::Piece,
            "pinch" | "pinches" => MeasurementUnit::Pinch,
            "pint" | "pints" | "pt" => MeasurementUnit::Pint,
            "quart" | "quarts" | "qt" => MeasurementUnit::Quart,
            "sprig" | "sprigs" => MeasurementUnit::Sprig,
            "tbsp" | "tbs" | "tablespoon" | "tablespoons" => MeasurementUnit::Tbsp,
            "tsp" | "teaspoon" | "teaspoons" => MeasurementUnit::Tsp,
            "whole" | "each" | "ea" | "unit" | "units" => MeasurementUnit::Whole,
            _ => return None,
        };
        Some(unit)
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for MeasurementUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for MeasurementUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        MeasurementUnit::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown measurement unit: {raw}")))
    }
}

/// Recipe category. Anything outside the closed set becomes [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Appetizers,
    BakedGoods,
    Beverages,
    Breakfast,
    Cakes,
    Candies,
    Cookies,
    CupcakesAndMuffins,
    FrostingsAndToppings,
    IceCream,
    Meat,
    Pies,
    Poultry,
    Salads,
    SaucesAndDressings,
    Seafood,
    Snacks,
    Soups,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 19] = [
        Category::Appetizers,
        Category::BakedGoods,
        Category::Beverages,
        Category::Breakfast,
        Category::Cakes,
        Category::Candies,
        Category::Cookies,
        Category::CupcakesAndMuffins,
        Category::FrostingsAndToppings,
        Category::IceCream,
        Category::Meat,
        Category::Pies,
        Category::Poultry,
        Category::Salads,
        Category::SaucesAndDressings,
        Category::Seafood,
        Category::Snacks,
        Category::Soups,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Appetizers => "Appetizers",
            Category::BakedGoods => "Baked Goods",
            Category::Beverages => "Beverages",
            Category::Breakfast => "Breakfast",
            Category::Cakes => "Cakes",
            Category::Candies => "Candies",
            Category::Cookies => "Cookies",
            Category::CupcakesAndMuffins => "Cupcakes & Muffins",
            Category::FrostingsAndToppings => "Frostings & Toppings",
            Category::IceCream => "Ice Cream",
            Category::Meat => "Meat",
            Category::Pies => "Pies",
            Category::Poultry => "Poultry",
            Category::Salads => "Salads",
            Category::SaucesAndDressings => "Sauces & Dressings",
            Category::Seafood => "Seafood",
            Category::Snacks => "Snacks",
            Category::Soups => "Soups",
            Category::Other => "Other",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }

    /// Case-insensitive match against the canonical labels. `and` is accepted
    /// in place of `&`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_label(raw);
        Self::ALL
            .iter()
            .copied()
            .find(|c| normalize_label(c.label()) == normalized)
    }

    /// Total version of [`Category::parse`]: unknown values map to `Other`.
    pub fn coerce(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(Category::Other)
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(" and ", " & ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::coerce(&raw))
    }
}
