pub mod calculations;
pub mod constants;

pub use calculations::{
    day_totals, macros_for_portion, meal_totals, parse_nutrient_text, parse_nutrient_value,
    week_totals, MacroTotals,
};
pub use constants::*;
