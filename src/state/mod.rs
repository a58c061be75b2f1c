mod backend;
mod local;
mod persistence;
mod saver;

pub use backend::{FoodCatalog, PlanStore, SessionContext};
pub use local::{load_catalog, CatalogFood, LocalBackend};
pub use persistence::{
    build_save_payload, load_plan, micronutrient_portions, plan_from_stored, CreatedPlan,
    LoadedPlan, PlanSummary, PortionRequest, SavePayload, SavedFood, SavedMeal, StoredDay,
    StoredFood, StoredMeal, StoredPlan,
};
pub use saver::{PlanSaver, SaveRequest, SaveStatus};
