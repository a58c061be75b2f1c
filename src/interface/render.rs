use std::collections::BTreeMap;

use crate::editor::AddFoodDialog;
use crate::models::{Day, Plan, SearchResult};
use crate::nutrition::constants::day_name;
use crate::nutrition::{day_totals, meal_totals, parse_nutrient_value, week_totals, MacroTotals};
use crate::state::PlanSummary;

/// One-line macro summary: kcal without decimals, grams with one.
pub fn format_macros(totals: &MacroTotals) -> String {
    format!(
        "{:.0} kcal | P {:.1} g | C {:.1} g | F {:.1} g",
        totals.kcal, totals.protein, totals.carbs, totals.fat
    )
}

/// Display the saved plans, newest first.
pub fn display_plan_list(plans: &[PlanSummary]) {
    if plans.is_empty() {
        println!("No saved plans.");
        return;
    }

    println!();
    println!("=== Saved plans ({}) ===", plans.len());
    println!();

    let max_name_len = plans.iter().map(|p| p.name.chars().count()).max().unwrap_or(10);
    for plan in plans {
        println!(
            "{:>5}  {:<width$}  {}",
            plan.id.0,
            plan.name,
            plan.created_at.format("%Y-%m-%d %H:%M"),
            width = max_name_len
        );
    }
    println!();
}

/// Display one day: meals in order, entries of expanded meals, totals.
pub fn display_day(index: usize, day: &Day) {
    println!();
    println!("=== {} ===", day_name(index));

    if day.meals.is_empty() {
        println!("  (no meals)");
    }

    for (position, meal) in day.meals.iter().enumerate() {
        let marker = if meal.is_expanded { "v" } else { ">" };
        println!(
            "{} {:>2}. {}  [{}]",
            marker,
            position + 1,
            meal.name,
            format_macros(&meal_totals(meal))
        );
        if !meal.is_expanded {
            continue;
        }
        if meal.foods.is_empty() {
            println!("       (empty)");
        }
        for (i, food) in meal.foods.iter().enumerate() {
            println!(
                "      {:>2}) {} - {:.0} g  ({})",
                i + 1,
                food.name,
                food.grams,
                format_macros(&food.macros())
            );
        }
    }

    println!("--- Day total: {}", format_macros(&day_totals(day)));
}

/// Display a whole plan, skipping days without meals.
pub fn display_plan(plan: &Plan) {
    println!();
    println!("##### {} #####", plan.name);

    if plan.week.is_empty() {
        println!("(empty plan)");
        return;
    }

    for (index, day) in plan.week.days().iter().enumerate() {
        if !day.meals.is_empty() {
            display_day(index, day);
        }
    }

    let totals = week_totals(&plan.week);
    let week: MacroTotals = totals.iter().copied().sum();
    println!();
    println!("--- Summary ---");
    for (index, day) in totals.iter().enumerate() {
        if !day.is_zero() {
            println!("{:<10} {}", day_name(index), format_macros(day));
        }
    }
    println!("{:<10} {}", "Week", format_macros(&week));
    println!();
}

/// Display catalog matches with their values per 100 g.
pub fn display_search_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No foods found.");
        return;
    }

    for (i, food) in results.iter().enumerate() {
        println!("{:>3}. {}", i + 1, search_result_label(food));
    }
}

/// Label used in result lists and pickers.
pub fn search_result_label(food: &SearchResult) -> String {
    format!(
        "{} ({}) - {:.0} kcal, P {:.1} C {:.1} F {:.1} per 100 g",
        food.name,
        food.category_label(),
        parse_nutrient_value(&food.kcal_per100),
        parse_nutrient_value(&food.protein_per100),
        parse_nutrient_value(&food.carb_per100),
        parse_nutrient_value(&food.fat_per100),
    )
}

/// Display the pending choice of the add-food dialog.
pub fn display_dialog_preview(dialog: &AddFoodDialog) {
    let Some(food) = dialog.search().selected() else {
        return;
    };
    println!();
    println!("Selected: {}", food.name);
    if let Some(reference) = dialog.reference_values() {
        println!("  per 100 g:  {}", format_macros(&reference));
    }
    println!("  per {:.0} g:  {}", dialog.grams(), format_macros(&dialog.preview()));
}

pub fn display_micronutrients(values: &BTreeMap<String, f64>) {
    if values.is_empty() {
        println!("No micronutrient data for this day.");
        return;
    }

    println!();
    println!("=== Micronutrients ===");
    let max_name_len = values.keys().map(|k| k.chars().count()).max().unwrap_or(10);
    for (name, amount) in values {
        println!("  {:<width$}  {:>10.2}", name, amount, width = max_name_len);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutrientValue;

    #[test]
    fn test_format_macros_rounding() {
        let totals = MacroTotals {
            kcal: 499.6,
            protein: 25.04,
            carbs: 49.96,
            fat: 12.5,
        };
        assert_eq!(
            format_macros(&totals),
            "500 kcal | P 25.0 g | C 50.0 g | F 12.5 g"
        );
    }

    #[test]
    fn test_search_label_uses_category_placeholder() {
        let food = SearchResult {
            food_code: "A001".to_string(),
            name: "Pasta di semola".to_string(),
            category: None,
            kcal_per100: "353".into(),
            protein_per100: NutrientValue::Number(12.5),
            carb_per100: "tr".into(),
            fat_per100: "1,2".into(),
        };
        assert_eq!(
            search_result_label(&food),
            "Pasta di semola (Categoria non disponibile) - 353 kcal, P 12.5 C 0.0 F 1.2 per 100 g"
        );
    }
}
