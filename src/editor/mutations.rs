//! Week plan mutations.
//!
//! Every operation leaves `self` untouched and returns the next week, so a
//! caller can replace its plan in one step. An unknown meal id or food
//! position yields an unchanged copy. A day index outside `0..7` panics.

use tracing::debug;

use crate::editor::reorder::reorder;
use crate::models::{EntityId, FoodEntry, IdSource, Meal, WeekPlan};
use crate::nutrition::constants::DEFAULT_MEAL_NAME;

impl WeekPlan {
    /// Append an expanded, empty meal named "Pasto N", N = current meal count + 1.
    pub fn add_meal(&self, day: usize, ids: &dyn IdSource) -> WeekPlan {
        let mut next = self.clone();
        let meals = &mut next.day_mut(day).meals;
        let name = format!("{} {}", DEFAULT_MEAL_NAME, meals.len() + 1);
        meals.push(Meal::new(ids.next_id(), name));
        next
    }

    /// Replace a meal's name. Blank names are kept as-is.
    pub fn rename_meal(&self, day: usize, meal_id: &EntityId, new_name: &str) -> WeekPlan {
        self.with_meal(day, meal_id, |meal| meal.name = new_name.to_string())
    }

    pub fn toggle_meal(&self, day: usize, meal_id: &EntityId) -> WeekPlan {
        self.with_meal(day, meal_id, |meal| meal.is_expanded = !meal.is_expanded)
    }

    /// Append an entry to a meal and expand the meal.
    pub fn add_food(&self, day: usize, meal_id: &EntityId, entry: FoodEntry) -> WeekPlan {
        self.with_meal(day, meal_id, |meal| {
            meal.foods.push(entry);
            meal.is_expanded = true;
        })
    }

    /// Remove the entry at `index` within the meal.
    pub fn remove_food(&self, day: usize, meal_id: &EntityId, index: usize) -> WeekPlan {
        self.with_meal(day, meal_id, |meal| {
            if index < meal.foods.len() {
                meal.foods.remove(index);
            } else {
                debug!(meal_id = %meal.id, index, "food index out of range, nothing removed");
            }
        })
    }

    /// Delete a meal. Remaining meals keep their names.
    pub fn remove_meal(&self, day: usize, meal_id: &EntityId) -> WeekPlan {
        let mut next = self.clone();
        let meals = &mut next.day_mut(day).meals;
        let before = meals.len();
        meals.retain(|m| &m.id != meal_id);
        if meals.len() == before {
            debug!(day, meal_id = %meal_id, "meal not found, plan unchanged");
        }
        next
    }

    /// Move one meal within a day. `None` when nothing moves.
    pub fn reorder_meals(&self, day: usize, from: usize, to: usize) -> Option<WeekPlan> {
        let meals = reorder(&self.day(day).meals, from, to)?;
        let mut next = self.clone();
        next.day_mut(day).meals = meals;
        Some(next)
    }

    /// Append copies of every meal of `source` to `destination`.
    ///
    /// Copied meals and entries get fresh ids; names, expansion state and
    /// cached macros are carried over.
    pub fn copy_day(&self, source: usize, destination: usize, ids: &dyn IdSource) -> WeekPlan {
        let copies: Vec<Meal> = self
            .day(source)
            .meals
            .iter()
            .map(|meal| Meal {
                id: ids.next_id(),
                name: meal.name.clone(),
                is_expanded: meal.is_expanded,
                foods: meal
                    .foods
                    .iter()
                    .map(|food| FoodEntry {
                        id: ids.next_id(),
                        ..food.clone()
                    })
                    .collect(),
            })
            .collect();

        let mut next = self.clone();
        next.day_mut(destination).meals.extend(copies);
        next
    }

    fn with_meal(&self, day: usize, meal_id: &EntityId, f: impl FnOnce(&mut Meal)) -> WeekPlan {
        let mut next = self.clone();
        match next.day_mut(day).meals.iter_mut().find(|m| &m.id == meal_id) {
            Some(meal) => f(meal),
            None => debug!(day, meal_id = %meal_id, "meal not found, plan unchanged"),
        }
        next
    }
}
