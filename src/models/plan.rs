use crate::models::ids::EntityId;
use crate::nutrition::constants::DEFAULT_PLAN_NAME;
use crate::nutrition::MacroTotals;

/// Number of days in a plan week, Monday first.
pub const DAYS_IN_WEEK: usize = 7;

/// One quantified food inside a meal.
///
/// The nutrient fields are cached at the gram quantity chosen when the
/// entry was added; changing `grams` does not recompute them.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodEntry {
    pub id: EntityId,

    /// Catalog key. Entries restored from storage may lack one.
    pub food_code: Option<String>,

    pub name: String,

    pub grams: f64,

    pub kcal: f64,

    pub protein: f64,

    pub carbs: f64,

    pub fat: f64,
}

impl FoodEntry {
    pub fn macros(&self) -> MacroTotals {
        MacroTotals {
            kcal: self.kcal,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }

    /// Whether the entry can be sent to the backend: a non-blank code and positive grams.
    pub fn is_persistable(&self) -> bool {
        self.catalog_code().is_some() && self.grams > 0.0
    }

    /// Catalog code with surrounding whitespace removed, `None` when blank.
    pub fn catalog_code(&self) -> Option<&str> {
        self.food_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// A named, orderable group of food entries within one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Meal {
    pub id: EntityId,
    pub name: String,
    pub is_expanded: bool,
    pub foods: Vec<FoodEntry>,
}

impl Meal {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_expanded: true,
            foods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Day {
    pub meals: Vec<Meal>,
}

impl Day {
    pub fn meal(&self, meal_id: &EntityId) -> Option<&Meal> {
        self.meals.iter().find(|m| &m.id == meal_id)
    }

    pub fn meal_position(&self, meal_id: &EntityId) -> Option<usize> {
        self.meals.iter().position(|m| &m.id == meal_id)
    }

    /// All food entries of the day, in meal order.
    pub fn entries(&self) -> impl Iterator<Item = &FoodEntry> {
        self.meals.iter().flat_map(|m| m.foods.iter())
    }
}

/// Exactly seven days, index 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPlan {
    days: [Day; DAYS_IN_WEEK],
}

impl WeekPlan {
    pub fn empty() -> Self {
        Self {
            days: std::array::from_fn(|_| Day::default()),
        }
    }

    pub fn from_days(days: [Day; DAYS_IN_WEEK]) -> Self {
        Self { days }
    }

    /// Day by index. Panics when `index` is not in `0..7`.
    #[track_caller]
    pub fn day(&self, index: usize) -> &Day {
        assert!(
            index < DAYS_IN_WEEK,
            "day index {index} out of range 0..{DAYS_IN_WEEK}"
        );
        &self.days[index]
    }

    #[track_caller]
    pub(crate) fn day_mut(&mut self, index: usize) -> &mut Day {
        assert!(
            index < DAYS_IN_WEEK,
            "day index {index} out of range 0..{DAYS_IN_WEEK}"
        );
        &mut self.days[index]
    }

    pub fn days(&self) -> &[Day; DAYS_IN_WEEK] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| d.meals.is_empty())
    }
}

impl Default for WeekPlan {
    fn default() -> Self {
        Self::empty()
    }
}

/// The full user-authored plan: a name and its week.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub name: String,
    pub week: WeekPlan,
}

impl Plan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            week: WeekPlan::empty(),
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new(DEFAULT_PLAN_NAME)
    }
}
