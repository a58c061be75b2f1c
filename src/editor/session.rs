use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::editor::dialog::AddFoodDialog;
use crate::editor::reorder::DropGesture;
use crate::error::Result;
use crate::models::{Day, EntityId, IdSource, Plan, PlanId, DAYS_IN_WEEK};
use crate::nutrition::{day_totals, meal_totals, MacroTotals};
use crate::overlay::{MicronutrientOverlay, OverlayRequest, OverlayResponse, OverlayState};
use crate::search::FoodSearchController;
use crate::state::{load_plan, FoodCatalog, PlanSaver, PlanStore, SaveRequest, SaveStatus, SessionContext};

/// Collaborators an editor session works against.
#[derive(Clone)]
pub struct EditorDeps {
    pub store: Arc<dyn PlanStore>,
    pub catalog: Arc<dyn FoodCatalog>,
    pub ids: Arc<dyn IdSource>,
    pub session: SessionContext,
}

/// One editing session over a single plan.
///
/// The plan is the source of truth: every edit replaces it with the week
/// returned by the corresponding mutation. Totals are derived on request.
pub struct EditorSession {
    deps: EditorDeps,
    config: EditorConfig,
    plan: Plan,
    active_day: usize,
    saver: PlanSaver,
    dialog: Option<AddFoodDialog>,
    overlay: MicronutrientOverlay,
    notice: Option<String>,
}

impl EditorSession {
    /// Fresh session over a new, unsaved plan.
    pub fn new(deps: EditorDeps, config: EditorConfig) -> Self {
        let saver = PlanSaver::new(None, config.save_redirect_delay());
        Self {
            deps,
            config,
            plan: Plan::default(),
            active_day: 0,
            saver,
            dialog: None,
            overlay: MicronutrientOverlay::new(),
            notice: None,
        }
    }

    /// Enter the editor, loading `plan_id` when given.
    ///
    /// A failed load leaves a fresh plan and a notice instead of an error.
    pub async fn open(deps: EditorDeps, config: EditorConfig, plan_id: Option<PlanId>) -> Self {
        let loaded = load_plan(deps.store.as_ref(), &deps.session, plan_id, deps.ids.as_ref()).await;
        let mut editor = Self::new(deps, config);
        editor.plan = loaded.plan;
        editor.saver = PlanSaver::new(loaded.bound_id, editor.config.save_redirect_delay());
        editor.notice = loaded.notice;
        editor
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn bound_id(&self) -> Option<PlanId> {
        self.saver.bound_id()
    }

    pub fn active_day(&self) -> usize {
        self.active_day
    }

    /// Panics when `day` is not in `0..7`.
    #[track_caller]
    pub fn set_active_day(&mut self, day: usize) {
        assert!(day < DAYS_IN_WEEK, "day index {day} out of range");
        if self.active_day != day {
            self.overlay.close();
        }
        self.active_day = day;
    }

    pub fn day(&self) -> &Day {
        self.plan.week.day(self.active_day)
    }

    /// Message left for the user by the last failed operation.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn set_plan_name(&mut self, name: impl Into<String>) {
        self.plan.name = name.into();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Derived totals
    // ─────────────────────────────────────────────────────────────────────

    pub fn day_totals(&self) -> MacroTotals {
        day_totals(self.day())
    }

    pub fn meal_totals(&self, meal_id: &EntityId) -> Option<MacroTotals> {
        self.day().meal(meal_id).map(meal_totals)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Meal edits on the active day
    // ─────────────────────────────────────────────────────────────────────

    /// Append a meal and return its id.
    pub fn add_meal(&mut self) -> EntityId {
        self.plan.week = self.plan.week.add_meal(self.active_day, self.deps.ids.as_ref());
        let meals = &self.day().meals;
        meals[meals.len() - 1].id.clone()
    }

    pub fn rename_meal(&mut self, meal_id: &EntityId, name: &str) {
        self.plan.week = self.plan.week.rename_meal(self.active_day, meal_id, name);
    }

    pub fn toggle_meal(&mut self, meal_id: &EntityId) {
        self.plan.week = self.plan.week.toggle_meal(self.active_day, meal_id);
    }

    pub fn remove_meal(&mut self, meal_id: &EntityId) {
        self.plan.week = self.plan.week.remove_meal(self.active_day, meal_id);
    }

    pub fn remove_food(&mut self, meal_id: &EntityId, index: usize) {
        self.plan.week = self.plan.week.remove_food(self.active_day, meal_id, index);
    }

    /// Apply a finished drag. Returns whether the plan was replaced.
    pub fn drop_meal(&mut self, gesture: DropGesture) -> bool {
        let Some((from, to)) = gesture.resolve() else {
            debug!(?gesture, "drop ignored");
            return false;
        };
        let len = self.day().meals.len();
        if from >= len || to >= len {
            debug!(from, to, len, "drop outside meal list ignored");
            return false;
        }
        match self.plan.week.reorder_meals(self.active_day, from, to) {
            Some(next) => {
                self.plan.week = next;
                true
            }
            None => false,
        }
    }

    /// Append copies of the active day's meals to `destination`.
    pub fn copy_day_to(&mut self, destination: usize) {
        self.plan.week = self
            .plan
            .week
            .copy_day(self.active_day, destination, self.deps.ids.as_ref());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Add-food dialog
    // ─────────────────────────────────────────────────────────────────────

    /// Open the dialog for a meal of the active day. Any open dialog is torn down first.
    pub fn open_add_food(&mut self, meal_id: &EntityId) -> bool {
        self.close_add_food();
        if self.day().meal(meal_id).is_none() {
            return false;
        }
        let search = FoodSearchController::new(self.deps.catalog.clone(), self.deps.session.clone())
            .with_debounce(self.config.debounce())
            .with_min_query_len(self.config.min_query_len);
        self.dialog = Some(AddFoodDialog::new(
            self.active_day,
            meal_id.clone(),
            search,
            self.config.default_grams,
        ));
        true
    }

    pub fn dialog(&self) -> Option<&AddFoodDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut AddFoodDialog> {
        self.dialog.as_mut()
    }

    pub fn close_add_food(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            dialog.close();
        }
    }

    /// Append the dialog's food to its meal and close the dialog.
    ///
    /// Does nothing, keeping the dialog open, while no food is selected or
    /// grams are not positive.
    pub fn confirm_add_food(&mut self) -> bool {
        let Some(dialog) = self.dialog.as_ref() else {
            return false;
        };
        let Some(entry) = dialog.build_entry(self.deps.ids.as_ref()) else {
            return false;
        };
        let (day, meal_id) = (dialog.day(), dialog.meal_id().clone());
        debug!(meal_id = %meal_id, food = %entry.name, grams = entry.grams, "adding food");
        self.plan.week = self.plan.week.add_food(day, &meal_id, entry);
        self.close_add_food();
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Save
    // ─────────────────────────────────────────────────────────────────────

    pub fn save_status(&self) -> &SaveStatus {
        self.saver.status()
    }

    /// Snapshot the plan for saving; `None` while a save is outstanding.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        self.saver.begin(&self.plan)
    }

    pub fn finish_save(&mut self, outcome: Result<PlanId>) -> &SaveStatus {
        self.saver.finish(outcome)
    }

    /// Run a whole save; a no-op returning the current status while one is outstanding.
    pub async fn save(&mut self) -> SaveStatus {
        let Some(request) = self.begin_save() else {
            return self.saver.status().clone();
        };
        let outcome = request
            .dispatch(self.deps.store.as_ref(), &self.deps.session)
            .await;
        let status = self.finish_save(outcome).clone();
        if let SaveStatus::Saved { plan_id, .. } = &status {
            info!(plan_id = %plan_id, "plan saved");
        }
        status
    }

    // ─────────────────────────────────────────────────────────────────────
    // Micronutrient overlay
    // ─────────────────────────────────────────────────────────────────────

    pub fn overlay(&self) -> &OverlayState {
        self.overlay.state()
    }

    /// Open the overlay for the active day; rejected when no entry qualifies.
    pub fn begin_micronutrients(&mut self) -> Result<OverlayRequest> {
        let day = self.plan.week.day(self.active_day);
        self.overlay.open(day)
    }

    pub fn settle_micronutrients(&mut self, response: OverlayResponse) -> bool {
        self.overlay.settle(response)
    }

    /// Open the overlay and wait for its values.
    pub async fn show_micronutrients(&mut self) -> Result<&OverlayState> {
        let request = self.begin_micronutrients()?;
        let response = request
            .dispatch(self.deps.catalog.as_ref(), &self.deps.session)
            .await;
        self.overlay.settle(response);
        Ok(self.overlay.state())
    }

    pub fn close_micronutrients(&mut self) {
        self.overlay.close();
    }
}
