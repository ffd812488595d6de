//! Macro totals

use crate::models::{Food, PlannedEntry};
use std::ops::{Add, AddAssign};

/// Canonical spelling of a serving unit
///
/// Aliases such as "grams" or "servings" map onto the units the server
/// accepts; anything else is returned lowercased and unchanged.
pub fn normalize_unit(unit: &str) -> String {
    let unit = unit.trim().to_lowercase();
    match unit.as_str() {
        "gram" | "grams" => "g".to_string(),
        "servings" | "portion" | "portions" => "serving".to_string(),
        _ => unit,
    }
}

/// Calories and macros in grams
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
}

impl MacroTotals {
    /// Contribution of `amount` of `food` in `unit`
    ///
    /// Mass and volume units scale against the food's serving size in
    /// grams; "serving" counts whole servings. Unknown units contribute
    /// nothing.
    pub fn for_food(food: &Food, amount: f64, unit: &str) -> Self {
        let factor = match normalize_unit(unit).as_str() {
            "g" | "ml" => food.portion_factor(amount),
            "kg" => food.portion_factor(amount * 1000.0),
            "serving" => amount,
            _ => 0.0,
        };
        Self {
            calories: food.calories * factor,
            protein: food.protein * factor,
            carbohydrates: food.carbohydrate * factor,
            fat: food.fat * factor,
        }
    }

    /// Sum of what the server reported for planned entries
    pub fn from_planned(entries: &[PlannedEntry]) -> Self {
        entries
            .iter()
            .map(|e| Self {
                calories: e.calories,
                protein: e.protein,
                carbohydrates: e.carbohydrates,
                fat: e.fat,
            })
            .fold(Self::default(), |acc, t| acc + t)
    }
}

impl Add for MacroTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbohydrates: self.carbohydrates + rhs.carbohydrates,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for MacroTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
