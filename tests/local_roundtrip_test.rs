#[macro_use]
extern crate assert_float_eq;

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use diet_builder_rs::config::EditorConfig;
use diet_builder_rs::editor::{EditorDeps, EditorSession};
use diet_builder_rs::models::UuidIds;
use diet_builder_rs::state::{LocalBackend, PlanStore, SaveStatus, SessionContext};

const CATALOG: &str = "\
code,name,category,nutrient,value_100g
A001,Pasta di semola,Cereali,Energia (kcal),353
A001,Pasta di semola,Cereali,Proteine (g),\"10,9\"
A001,Pasta di semola,Cereali,Carboidrati disponibili (g),79.1
A001,Pasta di semola,Cereali,Lipidi (g),1.4
B002,Pollo petto,Carni,Energia (kcal),100
B002,Pollo petto,Carni,Proteine (g),23.3
B002,Pollo petto,Carni,Lipidi (g),tr
";

fn setup() -> (TempDir, EditorConfig) {
    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("foods.csv");
    fs::write(&catalog_path, CATALOG).unwrap();
    let config = EditorConfig {
        store_path: dir.path().join("plans.json"),
        catalog_path,
        save_redirect_delay_ms: 0,
        ..EditorConfig::default()
    };
    (dir, config)
}

fn deps(config: &EditorConfig) -> EditorDeps {
    let backend = Arc::new(LocalBackend::open(&config.store_path, &config.catalog_path).unwrap());
    EditorDeps {
        store: backend.clone(),
        catalog: backend,
        ids: Arc::new(UuidIds),
        session: SessionContext::anonymous(),
    }
}

async fn add_food(editor: &mut EditorSession, query: &str, grams: f64) {
    let meal_id = editor.day().meals[0].id.clone();
    assert!(editor.open_add_food(&meal_id));
    let dialog = editor.dialog_mut().unwrap();
    dialog.search_mut().set_query(query);
    dialog.search_mut().settle().await;
    dialog.search_mut().select(0).expect("catalog match");
    dialog.set_grams(grams);
    assert!(editor.confirm_add_food());
}

#[tokio::test(start_paused = true)]
async fn test_saved_plan_reloads_with_catalog_macros() {
    let (_dir, config) = setup();

    let mut editor = EditorSession::new(deps(&config), config.clone());
    editor.set_plan_name("Settimana 1");
    editor.add_meal();
    add_food(&mut editor, "pasta", 80.0).await;
    add_food(&mut editor, "pollo", 150.4).await;
    editor.set_active_day(3);
    editor.add_meal();

    let SaveStatus::Saved { plan_id, .. } = editor.save().await else {
        panic!("save failed");
    };

    let reloaded = EditorSession::open(deps(&config), config.clone(), Some(plan_id)).await;
    assert_eq!(reloaded.bound_id(), Some(plan_id));
    assert_eq!(reloaded.plan().name, "Settimana 1");

    let monday = reloaded.plan().week.day(0);
    assert_eq!(monday.meals.len(), 1);
    assert_eq!(monday.meals[0].name, "Pasto 1");
    let foods = &monday.meals[0].foods;
    assert_eq!(foods.len(), 2);
    assert_eq!(foods[0].name, "Pasta di semola");
    assert_float_absolute_eq!(foods[0].kcal, 282.4, 1e-9);
    assert_float_absolute_eq!(foods[0].protein, 8.72, 1e-9);
    // Saved grams are whole numbers.
    assert_float_absolute_eq!(foods[1].grams, 150.0, 1e-9);
    assert_float_absolute_eq!(foods[1].fat, 0.0, 1e-9);

    assert_eq!(reloaded.plan().week.day(3).meals.len(), 1);
    assert!(reloaded.plan().week.day(6).meals.is_empty());
}

#[tokio::test]
async fn test_missing_plan_opens_fresh_editor() {
    let (_dir, config) = setup();

    let mut editor = EditorSession::open(
        deps(&config),
        config.clone(),
        Some(diet_builder_rs::models::PlanId(42)),
    )
    .await;

    assert_eq!(editor.bound_id(), None);
    assert_eq!(editor.take_notice().as_deref(), Some("Dieta non trovata."));
    assert!(editor.plan().week.is_empty());
}

#[tokio::test]
async fn test_listing_and_delete() {
    let (_dir, config) = setup();
    let session = SessionContext::anonymous();

    let mut first = EditorSession::new(deps(&config), config.clone());
    first.set_plan_name("A");
    first.save().await;
    let mut second = EditorSession::new(deps(&config), config.clone());
    second.set_plan_name("   ");
    second.save().await;

    let backend = LocalBackend::open(&config.store_path, &config.catalog_path).unwrap();
    let plans = backend.list_plans(&session).await.unwrap();
    assert_eq!(plans.len(), 2);
    let names: Vec<&str> = plans.iter().map(|p| p.name.as_str()).collect();
    assert!(names.contains(&"A"));
    assert!(names.contains(&diet_builder_rs::nutrition::DEFAULT_PLAN_NAME));

    backend.delete_plan(&session, plans[0].id).await.unwrap();
    assert_eq!(backend.list_plans(&session).await.unwrap().len(), 1);
    assert!(backend.delete_plan(&session, plans[0].id).await.is_err());
}
