mod food;
mod ids;
mod plan;

pub use food::{NutrientValue, SearchResult};
pub use ids::{EntityId, IdSource, PlanId, SequentialIds, UuidIds};
pub use plan::{Day, FoodEntry, Meal, Plan, WeekPlan, DAYS_IN_WEEK};
