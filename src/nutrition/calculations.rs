use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::models::{Day, Meal, NutrientValue, SearchResult, WeekPlan, DAYS_IN_WEEK};
use crate::nutrition::constants::{REFERENCE_GRAMS, TRACE_MARKER};

/// Energy and macronutrient amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroTotals {
    pub kcal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, rhs: Self) -> Self::Output {
        MacroTotals {
            kcal: self.kcal + rhs.kcal,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for MacroTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::zero(), |acc, m| acc + m)
    }
}

/// Parse a catalog nutrient amount.
///
/// Order matters: trim, lower-case, comma to period, trace/empty check,
/// numeric parse. Anything unparseable (including non-finite values) is zero.
pub fn parse_nutrient_value(raw: &NutrientValue) -> f64 {
    match raw {
        NutrientValue::Number(n) if n.is_finite() => *n,
        NutrientValue::Number(_) => 0.0,
        NutrientValue::Text(s) => parse_nutrient_text(s),
    }
}

/// String form of [`parse_nutrient_value`].
pub fn parse_nutrient_text(raw: &str) -> f64 {
    let value = raw.trim().to_lowercase().replace(',', ".");
    if value.is_empty() || value == TRACE_MARKER {
        return 0.0;
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Macros of `grams` of a catalog food, scaled linearly from its 100 g values.
///
/// Non-positive `grams` yields zero.
pub fn macros_for_portion(food: &SearchResult, grams: f64) -> MacroTotals {
    if grams <= 0.0 {
        return MacroTotals::zero();
    }
    let scale = |raw: &NutrientValue| parse_nutrient_value(raw) * grams / REFERENCE_GRAMS;
    MacroTotals {
        kcal: scale(&food.kcal_per100),
        protein: scale(&food.protein_per100),
        carbs: scale(&food.carb_per100),
        fat: scale(&food.fat_per100),
    }
}

/// Sum of the cached macros of every entry in the meal.
pub fn meal_totals(meal: &Meal) -> MacroTotals {
    meal.foods.iter().map(|f| f.macros()).sum()
}

/// Sum of [`meal_totals`] over the day's meals.
pub fn day_totals(day: &Day) -> MacroTotals {
    day.meals.iter().map(meal_totals).sum()
}

/// Per-day totals for the whole week.
pub fn week_totals(week: &WeekPlan) -> [MacroTotals; DAYS_IN_WEEK] {
    std::array::from_fn(|i| day_totals(week.day(i)))
}
