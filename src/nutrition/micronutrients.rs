//! Micronutrient keys
//!
//! The API keys micronutrients as `"Name (unit)"`, e.g. `"Vitamin C (mg)"`
//! or `"Iron, Fe (mg)"`. Grouping into vitamins and minerals is by
//! case-insensitive substring match on the name.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref KEY_RE: Regex = Regex::new(r"^\s*(.*?)\s*\(([^()]*)\)\s*$").unwrap();
}

/// Name and unit split out of a micronutrient key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MicronutrientKey {
    pub name: String,
    /// Empty when the key carries no unit
    pub unit: String,
}

/// Split `"Vitamin C (mg)"` into name and unit
pub fn parse_micronutrient_key(key: &str) -> MicronutrientKey {
    match KEY_RE.captures(key) {
        Some(caps) if !caps[1].is_empty() => MicronutrientKey {
            name: caps[1].to_string(),
            unit: caps[2].trim().to_string(),
        },
        _ => MicronutrientKey {
            name: key.trim().to_string(),
            unit: String::new(),
        },
    }
}

/// Display group of a micronutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MicronutrientGroup {
    Vitamin,
    Mineral,
    Other,
}

impl MicronutrientGroup {
    pub fn label(&self) -> &'static str {
        match self {
            MicronutrientGroup::Vitamin => "Vitamins",
            MicronutrientGroup::Mineral => "Minerals",
            MicronutrientGroup::Other => "Other",
        }
    }
}

impl fmt::Display for MicronutrientGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const VITAMIN_MARKERS: &[&str] = &[
    "vitamin",
    "thiamin",
    "riboflavin",
    "niacin",
    "pantothenic",
    "pyridoxine",
    "biotin",
    "folate",
    "folic acid",
    "cobalamin",
    "retinol",
    "carotene",
    "tocopherol",
    "phylloquinone",
    "choline",
];

const MINERAL_MARKERS: &[&str] = &[
    "calcium",
    "iron",
    "magnesium",
    "phosphorus",
    "potassium",
    "sodium",
    "zinc",
    "copper",
    "manganese",
    "selenium",
    "iodine",
    "chromium",
    "molybdenum",
    "fluoride",
    "chloride",
];

/// Vitamin, mineral or other, from the nutrient name
pub fn categorize(name: &str) -> MicronutrientGroup {
    let lower = name.to_lowercase();
    if VITAMIN_MARKERS.iter().any(|m| lower.contains(m)) {
        MicronutrientGroup::Vitamin
    } else if MINERAL_MARKERS.iter().any(|m| lower.contains(m)) {
        MicronutrientGroup::Mineral
    } else {
        MicronutrientGroup::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_with_unit() {
        let key = parse_micronutrient_key("Vitamin C (mg)");
        assert_eq!(key.name, "Vitamin C");
        assert_eq!(key.unit, "mg");
    }

    #[test]
    fn test_parse_key_with_comma_and_symbol() {
        let key = parse_micronutrient_key("Vitamin B-12 (µg)");
        assert_eq!(key.name, "Vitamin B-12");
        assert_eq!(key.unit, "µg");

        let key = parse_micronutrient_key("Iron, Fe (mg)");
        assert_eq!(key.name, "Iron, Fe");
    }

    #[test]
    fn test_parse_key_without_unit() {
        let key = parse_micronutrient_key("Lycopene");
        assert_eq!(key.name, "Lycopene");
        assert_eq!(key.unit, "");

        let key = parse_micronutrient_key("(mg)");
        assert_eq!(key.name, "(mg)");
        assert_eq!(key.unit, "");
    }

    #[test]
    fn test_parse_key_nested_parentheses_keeps_last_group() {
        let key = parse_micronutrient_key("Vitamin A (RAE) (µg)");
        assert_eq!(key.name, "Vitamin A (RAE)");
        assert_eq!(key.unit, "µg");
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("Vitamin D"), MicronutrientGroup::Vitamin);
        assert_eq!(categorize("Folate, total"), MicronutrientGroup::Vitamin);
        assert_eq!(categorize("Iron, Fe"), MicronutrientGroup::Mineral);
        assert_eq!(categorize("POTASSIUM"), MicronutrientGroup::Mineral);
        assert_eq!(categorize("Caffeine"), MicronutrientGroup::Other);
    }
}
