use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Day, EntityId, FoodEntry, IdSource, Meal, NutrientValue, Plan, PlanId, WeekPlan, DAYS_IN_WEEK};
use crate::nutrition::constants::{DEFAULT_MEAL_NAME, DEFAULT_PLAN_NAME};
use crate::nutrition::parse_nutrient_value;
use crate::state::backend::{PlanStore, SessionContext};

// ─────────────────────────────────────────────────────────────────────────────
// Outbound (save)
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a create or update call: the whole week, flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub name: String,
    pub meals: Vec<SavedMeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMeal {
    pub meal_name: String,

    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u8,

    /// 1-based position within the day.
    pub order: u32,

    pub foods: Vec<SavedFood>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFood {
    pub food_code: String,
    pub grams: u32,
}

/// One `{foodCode, grams}` item of a micronutrient request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortionRequest {
    pub food_code: String,
    pub grams: f64,
}

/// Response of a create call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreatedPlan {
    pub id: PlanId,
}

/// Row of the saved-plan listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: PlanId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Build the outbound payload from a snapshot of the plan.
///
/// Blank names fall back to defaults; entries without a catalog code or
/// whose grams do not round to at least one gram are left out. The live
/// plan is never modified.
pub fn build_save_payload(plan: &Plan) -> SavePayload {
    let mut skipped = 0usize;
    let mut meals = Vec::new();

    for (day_index, day) in plan.week.days().iter().enumerate() {
        for (position, meal) in day.meals.iter().enumerate() {
            let foods = meal
                .foods
                .iter()
                .filter_map(|entry| {
                    let saved = saved_food(entry);
                    if saved.is_none() {
                        skipped += 1;
                    }
                    saved
                })
                .collect();

            meals.push(SavedMeal {
                meal_name: non_blank_or(&meal.name, DEFAULT_MEAL_NAME),
                day_of_week: (day_index + 1) as u8,
                order: (position + 1) as u32,
                foods,
            });
        }
    }

    if skipped > 0 {
        debug!(skipped, "dropped invalid food entries from save payload");
    }

    SavePayload {
        name: non_blank_or(&plan.name, DEFAULT_PLAN_NAME),
        meals,
    }
}

fn saved_food(entry: &FoodEntry) -> Option<SavedFood> {
    if !entry.is_persistable() {
        return None;
    }
    let grams = entry.grams.round();
    if grams < 1.0 || grams > f64::from(u32::MAX) {
        return None;
    }
    Some(SavedFood {
        food_code: entry.catalog_code()?.to_string(),
        grams: grams as u32,
    })
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Portions of the day that can be sent for a micronutrient computation.
pub fn micronutrient_portions(day: &Day) -> Vec<PortionRequest> {
    day.entries()
        .filter(|entry| entry.is_persistable())
        .filter_map(|entry| {
            Some(PortionRequest {
                food_code: entry.catalog_code()?.to_string(),
                grams: entry.grams,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound (load)
// ─────────────────────────────────────────────────────────────────────────────

/// A plan as returned by a fetch. Every part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlan {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub week_plan: Option<Vec<StoredDay>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDay {
    #[serde(default)]
    pub meals: Vec<StoredMeal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMeal {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub is_expanded: Option<bool>,

    #[serde(default)]
    pub foods: Vec<StoredFood>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFood {
    #[serde(default)]
    pub food_code: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub grams: NutrientValue,

    #[serde(default)]
    pub kcal: NutrientValue,

    #[serde(default)]
    pub protein: NutrientValue,

    #[serde(default)]
    pub carbs: NutrientValue,

    #[serde(default)]
    pub fat: NutrientValue,
}

/// Convert a fetched plan into the in-memory model.
///
/// Missing name or week fall back to defaults; the week is padded or
/// truncated to seven days. Meals and entries receive fresh ids.
pub fn plan_from_stored(stored: StoredPlan, ids: &dyn IdSource) -> Plan {
    let name = stored
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PLAN_NAME.to_string());

    let Some(stored_days) = stored.week_plan else {
        return Plan::new(name);
    };

    if stored_days.len() != DAYS_IN_WEEK {
        warn!(
            days = stored_days.len(),
            "stored week does not have {} days, normalizing", DAYS_IN_WEEK
        );
    }

    let mut stored_days = stored_days.into_iter();
    let days: [Day; DAYS_IN_WEEK] = std::array::from_fn(|_| {
        stored_days
            .next()
            .map(|d| day_from_stored(d, ids))
            .unwrap_or_default()
    });

    Plan {
        name,
        week: WeekPlan::from_days(days),
    }
}

fn day_from_stored(stored: StoredDay, ids: &dyn IdSource) -> Day {
    let meals = stored
        .meals
        .into_iter()
        .enumerate()
        .map(|(position, meal)| Meal {
            id: ids.next_id(),
            name: meal
                .name
                .unwrap_or_else(|| format!("{} {}", DEFAULT_MEAL_NAME, position + 1)),
            is_expanded: meal.is_expanded.unwrap_or(true),
            foods: meal
                .foods
                .into_iter()
                .map(|food| food_from_stored(food, ids.next_id()))
                .collect(),
        })
        .collect();
    Day { meals }
}

fn food_from_stored(stored: StoredFood, id: EntityId) -> FoodEntry {
    let food_code = stored.food_code.filter(|c| !c.trim().is_empty());
    let name = stored
        .name
        .or_else(|| food_code.clone())
        .unwrap_or_default();
    FoodEntry {
        id,
        food_code,
        name,
        grams: parse_nutrient_value(&stored.grams),
        kcal: parse_nutrient_value(&stored.kcal),
        protein: parse_nutrient_value(&stored.protein),
        carbs: parse_nutrient_value(&stored.carbs),
        fat: parse_nutrient_value(&stored.fat),
    }
}

/// Plan to edit on entering the editor, and the id it stays bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlan {
    pub plan: Plan,
    pub bound_id: Option<PlanId>,

    /// Set when the fetch failed and a fresh plan was substituted.
    pub notice: Option<String>,
}

/// Fetch the plan bound to the session, or start a fresh one.
///
/// A failed fetch never blocks the editor: the result is a fresh empty plan,
/// unbound, so a later save creates a new plan instead of overwriting.
pub async fn load_plan(
    store: &dyn PlanStore,
    session: &SessionContext,
    id: Option<PlanId>,
    ids: &dyn IdSource,
) -> LoadedPlan {
    let Some(id) = id else {
        return LoadedPlan {
            plan: Plan::default(),
            bound_id: None,
            notice: None,
        };
    };

    info!(plan_id = %id, "fetching plan");
    match store.fetch_plan(session, id).await {
        Ok(stored) => LoadedPlan {
            plan: plan_from_stored(stored, ids),
            bound_id: Some(id),
            notice: None,
        },
        Err(e) => {
            warn!(plan_id = %id, error = %e, "plan fetch failed, starting a fresh plan");
            LoadedPlan {
                plan: Plan::default(),
                bound_id: None,
                notice: Some(e.user_message()),
            }
        }
    }
}
