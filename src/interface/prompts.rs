use dialoguer::{Confirm, Input, Select};

use crate::editor::DropGesture;
use crate::error::{PlanError, Result};
use crate::interface::render::search_result_label;
use crate::models::{Day, EntityId, Meal, SearchResult};
use crate::nutrition::constants::{day_name, DAY_NAMES};

/// What the user wants to do next in the editor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    SwitchDay,
    AddMeal,
    RenameMeal,
    ToggleMeal,
    MoveMeal,
    RemoveMeal,
    AddFood,
    RemoveFood,
    CopyDay,
    Micronutrients,
    RenamePlan,
    Save,
    Quit,
}

impl EditorAction {
    pub const ALL: [EditorAction; 13] = [
        EditorAction::SwitchDay,
        EditorAction::AddMeal,
        EditorAction::RenameMeal,
        EditorAction::ToggleMeal,
        EditorAction::MoveMeal,
        EditorAction::RemoveMeal,
        EditorAction::AddFood,
        EditorAction::RemoveFood,
        EditorAction::CopyDay,
        EditorAction::Micronutrients,
        EditorAction::RenamePlan,
        EditorAction::Save,
        EditorAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EditorAction::SwitchDay => "Switch day",
            EditorAction::AddMeal => "Add meal",
            EditorAction::RenameMeal => "Rename meal",
            EditorAction::ToggleMeal => "Expand/collapse meal",
            EditorAction::MoveMeal => "Move meal",
            EditorAction::RemoveMeal => "Remove meal",
            EditorAction::AddFood => "Add food",
            EditorAction::RemoveFood => "Remove food",
            EditorAction::CopyDay => "Copy day to...",
            EditorAction::Micronutrients => "Show micronutrients",
            EditorAction::RenamePlan => "Rename plan",
            EditorAction::Save => "Save",
            EditorAction::Quit => "Quit",
        }
    }
}

/// Prompt for the next editor action.
pub fn prompt_action(active_day: usize) -> Result<EditorAction> {
    let labels: Vec<&str> = EditorAction::ALL.iter().map(|a| a.label()).collect();
    let selection = Select::new()
        .with_prompt(format!("{} - what next?", day_name(active_day)))
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(EditorAction::ALL
        .get(selection)
        .copied()
        .unwrap_or(EditorAction::Quit))
}

/// Prompt for a day of the week, as an index in `0..7`.
pub fn prompt_day(prompt: &str, default: usize) -> Result<usize> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(&DAY_NAMES)
        .default(default)
        .interact()?)
}

/// Prompt for a meal of the day. `None` when the day has no meals or the user backs out.
pub fn prompt_meal(day: &Day, prompt: &str) -> Result<Option<EntityId>> {
    Ok(prompt_meal_position(day, prompt)?.map(|i| day.meals[i].id.clone()))
}

fn prompt_meal_position(day: &Day, prompt: &str) -> Result<Option<usize>> {
    if day.meals.is_empty() {
        println!("No meals on this day.");
        return Ok(None);
    }

    let mut options: Vec<String> = day.meals.iter().map(|m| m.name.clone()).collect();
    options.push("Cancel".to_string());

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&options)
        .default(0)
        .interact()?;

    Ok((selection < day.meals.len()).then_some(selection))
}

/// Prompt for a drag of one meal to a new slot.
pub fn prompt_meal_move(day: &Day) -> Result<Option<DropGesture>> {
    let Some(source) = prompt_meal_position(day, "Which meal to move?")? else {
        return Ok(None);
    };

    let mut slots: Vec<String> = (1..=day.meals.len()).map(|i| format!("Position {i}")).collect();
    slots.push("Drop outside the list".to_string());

    let selection = Select::new()
        .with_prompt(format!("Move '{}' to", day.meals[source].name))
        .items(&slots)
        .default(source)
        .interact()?;

    let destination = (selection < day.meals.len()).then_some(selection);
    Ok(Some(DropGesture::new(source, destination)))
}

/// Prompt for one entry of a meal, by position.
pub fn prompt_food(meal: &Meal) -> Result<Option<usize>> {
    if meal.foods.is_empty() {
        println!("'{}' has no foods.", meal.name);
        return Ok(None);
    }

    let mut options: Vec<String> = meal
        .foods
        .iter()
        .map(|f| format!("{} ({:.0} g)", f.name, f.grams))
        .collect();
    options.push("Cancel".to_string());

    let selection = Select::new()
        .with_prompt("Which food to remove?")
        .items(&options)
        .default(0)
        .interact()?;

    Ok((selection < meal.foods.len()).then_some(selection))
}

/// Prompt for free text with a prefilled default.
pub fn prompt_text(prompt: &str, default: &str) -> Result<String> {
    Ok(Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?)
}

/// Prompt for a search query; empty input means done.
pub fn prompt_query() -> Result<String> {
    Ok(Input::new()
        .with_prompt("Search food (Enter to cancel)")
        .allow_empty(true)
        .interact_text()?)
}

/// Prompt for a result of the current search.
pub fn prompt_search_result(results: &[SearchResult]) -> Result<Option<usize>> {
    let mut options: Vec<String> = results.iter().map(search_result_label).collect();
    options.push("Search again".to_string());

    let selection = Select::new()
        .with_prompt("Pick a food")
        .items(&options)
        .default(0)
        .interact()?;

    Ok((selection < results.len()).then_some(selection))
}

/// Prompt for a portion in grams; unparsable input is asked again.
pub fn prompt_grams(default: f64) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt("Grams")
        .default(format!("{default:.0}"))
        .validate_with(|input: &String| validate_grams(input))
        .interact_text()?;

    parse_grams(&input)
}

fn validate_grams(input: &str) -> std::result::Result<(), String> {
    parse_grams(input).map(|_| ()).map_err(|e| e.user_message())
}

fn parse_grams(input: &str) -> Result<f64> {
    input
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|g| g.is_finite())
        .ok_or_else(|| PlanError::InvalidInput("Invalid number".to_string()))
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
