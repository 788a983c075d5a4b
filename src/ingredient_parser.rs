//! Ingredient line parsing.
//!
//! Splits raw ingredient strings (e.g. "2 tablespoons shallots, minced") into
//! quantity, unit, name and notes. Used when coercing loosely-typed extraction
//! output and by the offline rule-based extractor.

use crate::model::Ingredient;
use crate::taxonomy::MeasurementUnit;

/// Leading bullet characters stripped from list items.
const BULLETS: &[char] = &['-', '*', '•', '▢', '◦', '·', '–'];

const VULGAR_FRACTIONS: &[(char, f64)] = &[
    ('½', 0.5),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('¼', 0.25),
    ('¾', 0.75),
    ('⅕', 0.2),
    ('⅛', 0.125),
    ('⅜', 0.375),
    ('⅝', 0.625),
    ('⅞', 0.875),
];

/// A quantity (and possibly a unit) read from the front of a string.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadingQuantity<'a> {
    pub quantity: f64,
    pub unit: Option<MeasurementUnit>,
    pub rest: &'a str,
}

/// Parse a single ingredient line. Returns `None` for blank lines.
///
/// Lines without a leading quantity are treated as one whole item.
pub fn parse_ingredient_line(line: &str) -> Option<Ingredient> {
    let line = line.trim().trim_start_matches(BULLETS).trim();
    if line.is_empty() {
        return None;
    }

    let (quantity, unit, rest) = match parse_leading_quantity(line) {
        Some(parsed) => (parsed.quantity, parsed.unit, parsed.rest),
        None => (1.0, None, line),
    };

    let rest = rest.trim();
    let rest = rest.strip_prefix("of ").unwrap_or(rest).trim();

    let (name, notes) = split_notes(rest);

    // "3 cloves" with nothing after: the unit word is the ingredient.
    if name.is_empty() {
        let name = unit.map(|u| u.label().to_string())?;
        return Some(Ingredient {
            ingredient_name: name,
            quantity,
            measurement_unit: MeasurementUnit::Whole,
            notes,
        });
    }

    Some(Ingredient {
        ingredient_name: name,
        quantity,
        measurement_unit: unit.unwrap_or(MeasurementUnit::Whole),
        notes,
    })
}

/// Read a quantity and an optional unit from the start of `text`.
///
/// Handles integers, decimals, fractions (`1/2`), mixed numbers (`1 1/2`),
/// unicode fractions (`1½`), ranges (`2-3`, `2 to 3`, lower bound kept) and
/// units glued to the number (`200g`).
pub fn parse_leading_quantity(text: &str) -> Option<LeadingQuantity<'_>> {
    let (first, mut rest) = next_token(text)?;

    let (mut quantity, glued_unit) = match parse_number(first) {
        Some(value) => (value, None),
        None => {
            let split = first.find(|c: char| c.is_alphabetic())?;
            let (number, unit) = first.split_at(split);
            let value = parse_number(number)?;
            let unit = MeasurementUnit::parse(unit)?;
            (value, Some(unit))
        }
    };

    if glued_unit.is_none() {
        // Mixed number: "1 1/2"
        if let Some((token, after)) = next_token(rest) {
            if quantity.fract() == 0.0 && is_fraction(token) {
                if let Some(fraction) = parse_number(token) {
                    quantity += fraction;
                    rest = after;
                }
            }
        }

        // Range: "2 - 3", "2 to 3"
        if let Some((token, after)) = next_token(rest) {
            if token == "-" || token == "to" || token == "–" {
                if let Some((upper, after_upper)) = next_token(after) {
                    if parse_number(upper).is_some() {
                        rest = after_upper;
                    }
                }
            }
        }
    }

    let (unit, rest) = match glued_unit {
        Some(unit) => (Some(unit), rest),
        None => match parse_unit(rest) {
            Some((unit, after)) => (Some(unit), after),
            None => (None, rest),
        },
    };

    Some(LeadingQuantity {
        quantity,
        unit,
        rest: rest.trim_start(),
    })
}

/// Parse a full quantity string such as `"2 tablespoons"` or `"1/2"`.
///
/// Trailing text that is neither a number nor a known unit is ignored.
pub fn parse_quantity_text(text: &str) -> Option<(f64, Option<MeasurementUnit>)> {
    parse_leading_quantity(text.trim()).map(|parsed| (parsed.quantity, parsed.unit))
}

fn parse_unit(text: &str) -> Option<(MeasurementUnit, &str)> {
    let (first, after_first) = next_token(text)?;

    // Two-word units first: "fl oz", "fluid ounces"
    if let Some((second, after_second)) = next_token(after_first) {
        let pair = format!("{first} {second}");
        if let Some(unit) = MeasurementUnit::parse(pair.trim_end_matches(',')) {
            return Some((unit, after_second));
        }
    }

    let unit = MeasurementUnit::parse(first.trim_end_matches(','))?;
    Some((unit, after_first))
}

fn split_notes(text: &str) -> (String, Option<String>) {
    let mut notes = Vec::new();
    let mut name = String::new();
    let mut depth = 0usize;
    let mut paren = String::new();

    let (main, trailing) = match find_top_level_comma(text) {
        Some(idx) => (&text[..idx], Some(text[idx + 1..].trim())),
        None => (text, None),
    };

    for c in main.chars() {
        match c {
            '(' => {
                if depth > 0 {
                    paren.push(c);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let inner = paren.trim().to_string();
                    if !inner.is_empty() {
                        notes.push(inner);
                    }
                    paren.clear();
                } else {
                    paren.push(c);
                }
            }
            _ if depth > 0 => paren.push(c),
            _ => name.push(c),
        }
    }

    if let Some(trailing) = trailing {
        if !trailing.is_empty() {
            notes.push(trailing.to_string());
        }
    }

    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let notes = if notes.is_empty() {
        None
    } else {
        Some(notes.join(", "))
    };
    (name, notes)
}

fn find_top_level_comma(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

fn next_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    match text.find(char::is_whitespace) {
        Some(end) => Some((&text[..end], &text[end..])),
        None => Some((text, "")),
    }
}

fn is_fraction(token: &str) -> bool {
    token.contains('/') || token.chars().any(|c| vulgar_value(c).is_some())
}

fn vulgar_value(c: char) -> Option<f64> {
    VULGAR_FRACTIONS
        .iter()
        .find(|(symbol, _)| *symbol == c)
        .map(|(_, value)| *value)
}

fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim_end_matches(',');
    if token.is_empty() {
        return None;
    }

    // "2-3": keep the lower bound
    if let Some((lower, upper)) = token.split_once(['-', '–']) {
        if !lower.is_empty() && !upper.is_empty() {
            return parse_number(lower);
        }
    }

    // "1½" or "½"
    if let Some(last) = token.chars().last() {
        if let Some(fraction) = vulgar_value(last) {
            let whole = &token[..token.len() - last.len_utf8()];
            if whole.is_empty() {
                return Some(fraction);
            }
            return whole
                .parse::<u32>()
                .ok()
                .map(|w| f64::from(w) + fraction);
        }
    }

    if let Some((numerator, denominator)) = token.split_once('/') {
        let numerator: f64 = numerator.parse().ok()?;
        let denominator: f64 = denominator.parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator);
    }

    if !token.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
