use crate::models::{EntityId, FoodEntry, IdSource};
use crate::nutrition::constants::REFERENCE_GRAMS;
use crate::nutrition::{macros_for_portion, MacroTotals};
use crate::search::FoodSearchController;

/// The add-food flow for one target meal: search, pick, choose grams, confirm.
pub struct AddFoodDialog {
    day: usize,
    meal_id: EntityId,
    grams: f64,
    search: FoodSearchController,
}

impl AddFoodDialog {
    pub fn new(day: usize, meal_id: EntityId, search: FoodSearchController, grams: f64) -> Self {
        Self {
            day,
            meal_id,
            grams,
            search,
        }
    }

    pub fn day(&self) -> usize {
        self.day
    }

    pub fn meal_id(&self) -> &EntityId {
        &self.meal_id
    }

    pub fn search(&self) -> &FoodSearchController {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut FoodSearchController {
        &mut self.search
    }

    pub fn grams(&self) -> f64 {
        self.grams
    }

    pub fn set_grams(&mut self, grams: f64) {
        self.grams = grams;
    }

    /// Catalog values of the selected food for the reference 100 g.
    pub fn reference_values(&self) -> Option<MacroTotals> {
        self.search
            .selected()
            .map(|food| macros_for_portion(food, REFERENCE_GRAMS))
    }

    /// Macros of the selected food at the chosen grams; zero without a valid choice.
    pub fn preview(&self) -> MacroTotals {
        match self.search.selected() {
            Some(food) if self.grams > 0.0 => macros_for_portion(food, self.grams),
            _ => MacroTotals::zero(),
        }
    }

    pub fn can_confirm(&self) -> bool {
        self.search.selected().is_some() && self.grams > 0.0
    }

    /// The entry to append, with macros frozen at the chosen grams.
    pub fn build_entry(&self, ids: &dyn IdSource) -> Option<FoodEntry> {
        if !self.can_confirm() {
            return None;
        }
        let food = self.search.selected()?;
        let macros = macros_for_portion(food, self.grams);
        Some(FoodEntry {
            id: ids.next_id(),
            food_code: Some(food.food_code.clone()),
            name: food.name.clone(),
            grams: self.grams,
            kcal: macros.kcal,
            protein: macros.protein,
            carbs: macros.carbs,
            fat: macros.fat,
        })
    }

    pub(crate) fn close(mut self) {
        self.search.close();
    }
}
