//! File-backed implementation of the collaborator traits.
//!
//! Plans live in a pretty-printed JSON file, the food catalog in a
//! long-format CSV (`code,name,category,nutrient,value_100g`, one row per
//! food and nutrient).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use tracing::{debug, info, warn};

use crate::error::{PlanError, Result};
use crate::models::{NutrientValue, PlanId, SearchResult, DAYS_IN_WEEK};
use crate::nutrition::constants::{
    is_macro_nutrient, MAX_SEARCH_RESULTS, NUTRIENT_CARBS, NUTRIENT_FAT, NUTRIENT_KCAL,
    NUTRIENT_PROTEIN, REFERENCE_GRAMS,
};
use crate::nutrition::{macros_for_portion, parse_nutrient_text};
use crate::state::backend::{FoodCatalog, PlanStore, SessionContext};
use crate::state::persistence::{
    CreatedPlan, PlanSummary, PortionRequest, SavePayload, SavedMeal, StoredDay, StoredFood,
    StoredMeal, StoredPlan,
};

#[derive(Debug, Deserialize)]
struct CatalogRow {
    code: String,
    name: String,
    #[serde(default)]
    category: Option<String>,
    nutrient: String,
    #[serde(default)]
    value_100g: String,
}

/// A catalog food with its raw per-100 g nutrient values.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogFood {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub nutrients: BTreeMap<String, String>,
}

impl CatalogFood {
    pub fn to_search_result(&self) -> SearchResult {
        let raw = |nutrient: &str| {
            self.nutrients
                .get(nutrient)
                .map(|v| NutrientValue::Text(v.clone()))
                .unwrap_or_default()
        };
        SearchResult {
            food_code: self.code.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            kcal_per100: raw(NUTRIENT_KCAL),
            protein_per100: raw(NUTRIENT_PROTEIN),
            carb_per100: raw(NUTRIENT_CARBS),
            fat_per100: raw(NUTRIENT_FAT),
        }
    }
}

/// Load the food catalog from a long-format CSV file.
///
/// Rows are grouped by code; a repeated nutrient keeps its last value.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, CatalogFood>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut foods: BTreeMap<String, CatalogFood> = BTreeMap::new();

    for row in reader.deserialize::<CatalogRow>() {
        let row = row?;
        let code = row.code.trim().to_string();
        if code.is_empty() {
            continue;
        }
        let food = foods.entry(code.clone()).or_insert_with(|| CatalogFood {
            code,
            name: row.name.trim().to_string(),
            category: row.category.filter(|c| !c.trim().is_empty()),
            nutrients: BTreeMap::new(),
        });
        food.nutrients
            .insert(row.nutrient.trim().to_string(), row.value_100g);
    }

    Ok(foods)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    id: PlanId,
    name: String,
    created_at: DateTime<Utc>,
    meals: Vec<SavedMeal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    plans: Vec<StoredRecord>,
}

fn load_store(path: &Path) -> Result<StoreFile> {
    if !path.exists() {
        return Ok(StoreFile::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_store(path: &Path, store: &StoreFile) -> Result<()> {
    let json = serde_json::to_string_pretty(store)?;
    fs::write(path, json)?;
    Ok(())
}

/// Local plan store and food catalog.
pub struct LocalBackend {
    store_path: PathBuf,
    store: Mutex<StoreFile>,
    catalog: BTreeMap<String, CatalogFood>,
}

impl LocalBackend {
    /// Open the store (a missing file is an empty store) and load the catalog.
    pub fn open(store_path: impl Into<PathBuf>, catalog_path: impl AsRef<Path>) -> Result<Self> {
        let catalog = load_catalog(catalog_path)?;
        Self::with_catalog(store_path, catalog)
    }

    pub fn with_catalog(
        store_path: impl Into<PathBuf>,
        catalog: BTreeMap<String, CatalogFood>,
    ) -> Result<Self> {
        let store_path = store_path.into();
        let store = load_store(&store_path)?;
        info!(
            plans = store.plans.len(),
            foods = catalog.len(),
            "opened local backend"
        );
        Ok(Self {
            store_path,
            store: Mutex::new(store),
            catalog,
        })
    }

    /// Open only the plan store, for commands that never read the catalog.
    pub fn store_only(store_path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_catalog(store_path, BTreeMap::new())
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut StoreFile) -> Result<T>) -> Result<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| PlanError::Request("plan store lock poisoned".to_string()))?;
        f(&mut store)
    }

    /// Apply `f` to a copy of the store and keep it only once it is on disk.
    fn commit<T>(&self, f: impl FnOnce(&mut StoreFile) -> Result<T>) -> Result<T> {
        self.with_store(|store| {
            let mut next = store.clone();
            let value = f(&mut next)?;
            save_store(&self.store_path, &next)?;
            *store = next;
            Ok(value)
        })
    }

    fn stored_food(&self, code: &str, grams: u32) -> StoredFood {
        let grams = f64::from(grams);
        match self.catalog.get(code) {
            Some(food) => {
                let macros = macros_for_portion(&food.to_search_result(), grams);
                StoredFood {
                    food_code: Some(code.to_string()),
                    name: Some(food.name.clone()),
                    grams: grams.into(),
                    kcal: macros.kcal.into(),
                    protein: macros.protein.into(),
                    carbs: macros.carbs.into(),
                    fat: macros.fat.into(),
                }
            }
            None => {
                warn!(food_code = code, "stored food missing from catalog");
                StoredFood {
                    food_code: Some(code.to_string()),
                    name: Some(code.to_string()),
                    grams: grams.into(),
                    ..StoredFood::default()
                }
            }
        }
    }
}

#[async_trait]
impl PlanStore for LocalBackend {
    async fn list_plans(&self, _session: &SessionContext) -> Result<Vec<PlanSummary>> {
        self.with_store(|store| {
            let mut plans: Vec<PlanSummary> = store
                .plans
                .iter()
                .map(|p| PlanSummary {
                    id: p.id,
                    name: p.name.clone(),
                    created_at: p.created_at,
                })
                .collect();
            plans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(plans)
        })
    }

    async fn fetch_plan(&self, _session: &SessionContext, id: PlanId) -> Result<StoredPlan> {
        let record = self.with_store(|store| {
            store
                .plans
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(PlanError::PlanNotFound(id))
        })?;

        let mut days: Vec<StoredDay> = vec![StoredDay::default(); DAYS_IN_WEEK];
        let mut meals = record.meals;
        meals.sort_by_key(|m| (m.day_of_week, m.order));
        for meal in meals {
            let Some(day) = (meal.day_of_week as usize)
                .checked_sub(1)
                .and_then(|i| days.get_mut(i))
            else {
                warn!(plan_id = %id, day = meal.day_of_week, "stored meal has invalid day, skipped");
                continue;
            };
            day.meals.push(StoredMeal {
                name: Some(meal.meal_name),
                is_expanded: Some(true),
                foods: meal
                    .foods
                    .iter()
                    .map(|f| self.stored_food(&f.food_code, f.grams))
                    .collect(),
            });
        }

        Ok(StoredPlan {
            name: Some(record.name),
            week_plan: Some(days),
        })
    }

    async fn create_plan(&self, _session: &SessionContext, payload: &SavePayload) -> Result<CreatedPlan> {
        self.commit(|store| {
            store.last_id += 1;
            let id = PlanId(store.last_id);
            store.plans.push(StoredRecord {
                id,
                name: payload.name.clone(),
                created_at: Utc::now(),
                meals: payload.meals.clone(),
            });
            debug!(plan_id = %id, "plan created");
            Ok(CreatedPlan { id })
        })
    }

    async fn update_plan(&self, _session: &SessionContext, id: PlanId, payload: &SavePayload) -> Result<()> {
        self.commit(|store| {
            let record = store
                .plans
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(PlanError::PlanNotFound(id))?;
            record.name = payload.name.clone();
            record.meals = payload.meals.clone();
            debug!(plan_id = %id, "plan updated");
            Ok(())
        })
    }

    async fn delete_plan(&self, _session: &SessionContext, id: PlanId) -> Result<()> {
        self.commit(|store| {
            let before = store.plans.len();
            store.plans.retain(|p| p.id != id);
            if store.plans.len() == before {
                return Err(PlanError::PlanNotFound(id));
            }
            debug!(plan_id = %id, "plan deleted");
            Ok(())
        })
    }
}

#[async_trait]
impl FoodCatalog for LocalBackend {
    async fn search_foods(&self, _session: &SessionContext, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim().to_lowercase();
        let mut matches: Vec<&CatalogFood> = self
            .catalog
            .values()
            .filter(|food| {
                food.name.to_lowercase().contains(&query)
                    || food
                        .category
                        .as_ref()
                        .is_some_and(|c| c.to_lowercase().contains(&query))
            })
            .collect();
        matches.sort_by(|a, b| {
            let score_a = jaro_winkler(&a.name.to_lowercase(), &query);
            let score_b = jaro_winkler(&b.name.to_lowercase(), &query);
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(matches
            .into_iter()
            .take(MAX_SEARCH_RESULTS)
            .map(CatalogFood::to_search_result)
            .collect())
    }

    async fn compute_micronutrients(
        &self,
        _session: &SessionContext,
        portions: &[PortionRequest],
    ) -> Result<BTreeMap<String, f64>> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for portion in portions {
            let Some(food) = self.catalog.get(&portion.food_code) else {
                warn!(food_code = %portion.food_code, "unknown food in micronutrient request");
                continue;
            };
            for (nutrient, raw) in &food.nutrients {
                if is_macro_nutrient(nutrient) {
                    continue;
                }
                *totals.entry(nutrient.clone()).or_insert(0.0) +=
                    parse_nutrient_text(raw) * portion.grams / REFERENCE_GRAMS;
            }
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const CATALOG: &str = "\
code,name,category,nutrient,value_100g
A001,Pasta di semola,Cereali,Energia (kcal),353
A001,Pasta di semola,Cereali,Proteine (g),\"10,9\"
A001,Pasta di semola,Cereali,Carboidrati disponibili (g),79.1
A001,Pasta di semola,Cereali,Lipidi (g),1.4
A001,Pasta di semola,Cereali,Ferro (mg),\"1,4\"
B002,Pollo petto,Carni,Energia (kcal),100
B002,Pollo petto,Carni,Proteine (g),23.3
B002,Pollo petto,Carni,Lipidi (g),tr
B002,Pollo petto,Carni,Ferro (mg),0.4
B002,Pollo petto,Carni,Potassio (mg),370
";

    fn backend() -> (LocalBackend, TempDir) {
        let mut csv_file = NamedTempFile::new().unwrap();
        csv_file.write_all(CATALOG.as_bytes()).unwrap();
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::open(dir.path().join("plans.json"), csv_file.path()).unwrap();
        (backend, dir)
    }

    #[test]
    fn test_load_catalog_groups_rows() {
        let mut csv_file = NamedTempFile::new().unwrap();
        csv_file.write_all(CATALOG.as_bytes()).unwrap();
        let catalog = load_catalog(csv_file.path()).unwrap();

        assert_eq!(catalog.len(), 2);
        let pasta = &catalog["A001"];
        assert_eq!(pasta.nutrients.len(), 5);
        assert_eq!(pasta.nutrients["Proteine (g)"], "10,9");
    }

    #[tokio::test]
    async fn test_search_matches_name_and_category() {
        let (backend, _dir) = backend();
        let session = SessionContext::anonymous();

        let by_name = backend.search_foods(&session, "POLLO").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].food_code, "B002");
        assert_eq!(by_name[0].carb_per100, NutrientValue::default());

        let by_category = backend.search_foods(&session, "cereali").await.unwrap();
        assert_eq!(by_category[0].name, "Pasta di semola");

        assert!(backend.search_foods(&session, "xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_micronutrients_scale_and_skip_macros() {
        let (backend, _dir) = backend();
        let portions = vec![
            PortionRequest { food_code: "A001".to_string(), grams: 200.0 },
            PortionRequest { food_code: "B002".to_string(), grams: 50.0 },
            PortionRequest { food_code: "ZZZ".to_string(), grams: 10.0 },
        ];
        let micros = backend
            .compute_micronutrients(&SessionContext::anonymous(), &portions)
            .await
            .unwrap();

        assert_eq!(micros.len(), 2);
        assert!((micros["Ferro (mg)"] - 3.0).abs() < 1e-9);
        assert!((micros["Potassio (mg)"] - 185.0).abs() < 1e-9);
        assert!(!micros.contains_key(NUTRIENT_KCAL));
    }

    #[tokio::test]
    async fn test_create_fetch_update_delete() {
        let (backend, dir) = backend();
        let session = SessionContext::anonymous();
        let payload = SavePayload {
            name: "Settimana".to_string(),
            meals: vec![
                SavedMeal {
                    meal_name: "Cena".to_string(),
                    day_of_week: 2,
                    order: 2,
                    foods: vec![],
                },
                SavedMeal {
                    meal_name: "Pranzo".to_string(),
                    day_of_week: 2,
                    order: 1,
                    foods: vec![crate::state::persistence::SavedFood {
                        food_code: "A001".to_string(),
                        grams: 80,
                    }],
                },
            ],
        };

        let created = backend.create_plan(&session, &payload).await.unwrap();
        assert_eq!(created.id, PlanId(1));
        assert!(dir.path().join("plans.json").exists());

        let stored = backend.fetch_plan(&session, created.id).await.unwrap();
        let days = stored.week_plan.unwrap();
        assert_eq!(days.len(), DAYS_IN_WEEK);
        assert_eq!(days[1].meals[0].name.as_deref(), Some("Pranzo"));
        assert_eq!(days[1].meals[1].name.as_deref(), Some("Cena"));
        let pasta = &days[1].meals[0].foods[0];
        assert_eq!(pasta.name.as_deref(), Some("Pasta di semola"));
        match pasta.kcal {
            NutrientValue::Number(k) => assert!((k - 282.4).abs() < 1e-9),
            ref other => panic!("unexpected kcal {other:?}"),
        }

        let renamed = SavePayload { name: "Inverno".to_string(), meals: vec![] };
        backend.update_plan(&session, created.id, &renamed).await.unwrap();
        let listed = backend.list_plans(&session).await.unwrap();
        assert_eq!(listed[0].name, "Inverno");

        backend.delete_plan(&session, created.id).await.unwrap();
        assert!(matches!(
            backend.fetch_plan(&session, created.id).await,
            Err(PlanError::PlanNotFound(_))
        ));
        assert!(backend.delete_plan(&session, created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let mut csv_file = NamedTempFile::new().unwrap();
        csv_file.write_all(CATALOG.as_bytes()).unwrap();
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("plans.json");
        let session = SessionContext::anonymous();

        let first = LocalBackend::open(&store_path, csv_file.path()).unwrap();
        let payload = SavePayload { name: "A".to_string(), meals: vec![] };
        first.create_plan(&session, &payload).await.unwrap();

        let second = LocalBackend::open(&store_path, csv_file.path()).unwrap();
        let created = second.create_plan(&session, &payload).await.unwrap();
        assert_eq!(created.id, PlanId(2));
        assert_eq!(second.list_plans(&session).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::store_only(dir.path().join("missing").join("plans.json")).unwrap();
        let session = SessionContext::anonymous();
        let payload = SavePayload { name: "A".to_string(), meals: vec![] };

        assert!(backend.create_plan(&session, &payload).await.is_err());
        assert!(backend.create_plan(&session, &payload).await.is_err());
        assert!(backend.list_plans(&session).await.unwrap().is_empty());

        fs::create_dir(dir.path().join("missing")).unwrap();
        let created = backend.create_plan(&session, &payload).await.unwrap();
        assert_eq!(created.id, PlanId(1));
    }

    #[tokio::test]
    async fn test_failed_update_and_delete_keep_plan() {
        let (backend, dir) = backend();
        let session = SessionContext::anonymous();
        let payload = SavePayload { name: "A".to_string(), meals: vec![] };
        let created = backend.create_plan(&session, &payload).await.unwrap();

        // A directory in place of the store file makes every write fail.
        let store_path = dir.path().join("plans.json");
        fs::remove_file(&store_path).unwrap();
        fs::create_dir(&store_path).unwrap();

        let renamed = SavePayload { name: "B".to_string(), meals: vec![] };
        assert!(backend.update_plan(&session, created.id, &renamed).await.is_err());
        assert!(backend.delete_plan(&session, created.id).await.is_err());

        let listed = backend.list_plans(&session).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "A");
    }

    #[tokio::test]
    async fn test_store_only_lists_and_deletes() {
        let (backend, dir) = backend();
        let session = SessionContext::anonymous();
        let payload = SavePayload { name: "A".to_string(), meals: vec![] };
        let created = backend.create_plan(&session, &payload).await.unwrap();

        let store = LocalBackend::store_only(dir.path().join("plans.json")).unwrap();
        assert_eq!(store.list_plans(&session).await.unwrap().len(), 1);
        store.delete_plan(&session, created.id).await.unwrap();
        assert!(store.list_plans(&session).await.unwrap().is_empty());
        assert!(store.search_foods(&session, "pasta").await.unwrap().is_empty());
    }
}
