/// Name given to a fresh plan, and to a plan saved with a blank name.
pub const DEFAULT_PLAN_NAME: &str = "Dieta Ricomposizione";

/// Meal name prefix; new meals are called "Pasto N", blank names save as "Pasto".
pub const DEFAULT_MEAL_NAME: &str = "Pasto";

/// Reference quantity the catalog values are expressed for.
pub const REFERENCE_GRAMS: f64 = 100.0;

/// Catalog marker for a negligible amount, read as zero.
pub const TRACE_MARKER: &str = "tr";

// ─────────────────────────────────────────────────────────────────────────────
// Editor interaction
// ─────────────────────────────────────────────────────────────────────────────

/// Quiet period before a search request is issued.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Queries shorter than this (after trimming) never reach the catalog.
pub const MIN_QUERY_LEN: usize = 2;

/// Gram quantity preselected in the add-food dialog.
pub const DEFAULT_PORTION_GRAMS: f64 = 100.0;

/// Delay between a successful save and leaving the editor.
pub const SAVE_REDIRECT_DELAY_MS: u64 = 1500;

/// Maximum number of catalog rows returned by one search.
pub const MAX_SEARCH_RESULTS: usize = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Catalog nutrient names
// ─────────────────────────────────────────────────────────────────────────────

pub const NUTRIENT_KCAL: &str = "Energia (kcal)";
pub const NUTRIENT_PROTEIN: &str = "Proteine (g)";
pub const NUTRIENT_CARBS: &str = "Carboidrati disponibili (g)";
pub const NUTRIENT_FAT: &str = "Lipidi (g)";

/// Nutrients that make up the macro totals; everything else is a micronutrient.
pub const MACRO_NUTRIENTS: [&str; 4] = [NUTRIENT_KCAL, NUTRIENT_PROTEIN, NUTRIENT_CARBS, NUTRIENT_FAT];

// ─────────────────────────────────────────────────────────────────────────────
// Display
// ─────────────────────────────────────────────────────────────────────────────

pub const DAY_NAMES: [&str; 7] = [
    "Lunedì",
    "Martedì",
    "Mercoledì",
    "Giovedì",
    "Venerdì",
    "Sabato",
    "Domenica",
];

/// Get the display name of a day index (0 = Monday).
pub fn day_name(index: usize) -> &'static str {
    DAY_NAMES.get(index).copied().unwrap_or("?")
}

/// Whether a catalog nutrient name is one of the four macros.
pub fn is_macro_nutrient(name: &str) -> bool {
    MACRO_NUTRIENTS.contains(&name)
}
