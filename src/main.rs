use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use diet_builder_rs::cli::{Cli, Command};
use diet_builder_rs::config::{resolve_config, EditorConfig};
use diet_builder_rs::editor::{EditorDeps, EditorSession};
use diet_builder_rs::error::Result;
use diet_builder_rs::interface::{
    display_day, display_dialog_preview, display_micronutrients, display_plan, display_plan_list,
    display_search_results, prompt_action, prompt_day, prompt_food, prompt_grams, prompt_meal,
    prompt_meal_move, prompt_query, prompt_search_result, prompt_text, prompt_yes_no, EditorAction,
};
use diet_builder_rs::models::{EntityId, PlanId, UuidIds};
use diet_builder_rs::overlay::OverlayState;
use diet_builder_rs::search::{FoodSearchController, SearchPhase};
use diet_builder_rs::state::{plan_from_stored, LocalBackend, PlanStore, SaveStatus, SessionContext};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }

    let session = SessionContext::anonymous();
    let command = cli.command.unwrap_or_default();

    // Listing and deleting only touch the plan store.
    match command {
        Command::List => {
            let store = LocalBackend::store_only(&config.store_path)?;
            return cmd_list(&store, &session).await;
        }
        Command::Delete { id } => {
            let store = LocalBackend::store_only(&config.store_path)?;
            return cmd_delete(&store, &session, PlanId(id)).await;
        }
        _ => {}
    }

    let Some(backend) = open_backend(&config)? else {
        return Ok(());
    };

    match command {
        Command::Show { id } => cmd_show(&backend, &session, PlanId(id)).await,
        Command::Search { query } => cmd_search(backend, session, &config, &query).await,
        Command::Edit { id } => cmd_edit(backend, session, config, id.map(PlanId)).await,
        Command::List | Command::Delete { .. } => Ok(()),
    }
}

/// Plan store plus catalog; `show` needs the catalog to rebuild names and macros.
fn open_backend(config: &EditorConfig) -> Result<Option<Arc<LocalBackend>>> {
    if !Path::new(&config.catalog_path).exists() {
        eprintln!("Food catalog not found: {}", config.catalog_path.display());
        eprintln!("Pass --catalog or set catalog_path in the config file.");
        return Ok(None);
    }
    let backend = LocalBackend::open(&config.store_path, &config.catalog_path)?;
    Ok(Some(Arc::new(backend)))
}

/// List saved plans.
async fn cmd_list(backend: &LocalBackend, session: &SessionContext) -> Result<()> {
    let plans = backend.list_plans(session).await?;
    display_plan_list(&plans);
    Ok(())
}

/// Print one saved plan.
async fn cmd_show(backend: &LocalBackend, session: &SessionContext, id: PlanId) -> Result<()> {
    let stored = backend.fetch_plan(session, id).await?;
    let plan = plan_from_stored(stored, &UuidIds);
    display_plan(&plan);
    Ok(())
}

/// Delete one saved plan after confirmation.
async fn cmd_delete(backend: &LocalBackend, session: &SessionContext, id: PlanId) -> Result<()> {
    if !prompt_yes_no(&format!("Delete plan {}?", id), false)? {
        return Ok(());
    }
    backend.delete_plan(session, id).await?;
    println!("Plan {} deleted.", id);
    Ok(())
}

/// One query through the same debounced controller the editor uses.
async fn cmd_search(
    backend: Arc<LocalBackend>,
    session: SessionContext,
    config: &EditorConfig,
    query: &str,
) -> Result<()> {
    let mut search = FoodSearchController::new(backend, session)
        .with_debounce(config.debounce())
        .with_min_query_len(config.min_query_len);
    search.set_query(query);

    match search.settle().await {
        SearchPhase::Idle => println!(
            "Query too short: type at least {} characters.",
            config.min_query_len
        ),
        SearchPhase::Errored => eprintln!("{}", search.error().unwrap_or_default()),
        _ => display_search_results(search.results()),
    }
    Ok(())
}

/// Interactive editor loop over one plan.
async fn cmd_edit(
    backend: Arc<LocalBackend>,
    session: SessionContext,
    config: EditorConfig,
    id: Option<PlanId>,
) -> Result<()> {
    let deps = EditorDeps {
        store: backend.clone(),
        catalog: backend,
        ids: Arc::new(UuidIds),
        session,
    };
    let mut editor = EditorSession::open(deps, config, id).await;
    if let Some(notice) = editor.take_notice() {
        eprintln!("{}", notice);
    }

    println!("Editing '{}'", editor.plan().name);

    loop {
        display_day(editor.active_day(), editor.day());

        match prompt_action(editor.active_day())? {
            EditorAction::SwitchDay => {
                let day = prompt_day("Which day?", editor.active_day())?;
                editor.set_active_day(day);
            }
            EditorAction::AddMeal => {
                editor.add_meal();
            }
            EditorAction::RenameMeal => {
                if let Some(meal_id) = prompt_meal(editor.day(), "Which meal to rename?")? {
                    let current = editor
                        .day()
                        .meal(&meal_id)
                        .map(|m| m.name.clone())
                        .unwrap_or_default();
                    let name = prompt_text("New name", &current)?;
                    editor.rename_meal(&meal_id, &name);
                }
            }
            EditorAction::ToggleMeal => {
                if let Some(meal_id) = prompt_meal(editor.day(), "Which meal?")? {
                    editor.toggle_meal(&meal_id);
                }
            }
            EditorAction::MoveMeal => {
                if let Some(gesture) = prompt_meal_move(editor.day())? {
                    editor.drop_meal(gesture);
                }
            }
            EditorAction::RemoveMeal => {
                if let Some(meal_id) = prompt_meal(editor.day(), "Which meal to remove?")? {
                    if prompt_yes_no("Remove this meal and all its foods?", false)? {
                        editor.remove_meal(&meal_id);
                    }
                }
            }
            EditorAction::AddFood => {
                if let Some(meal_id) = prompt_meal(editor.day(), "Add food to which meal?")? {
                    if let Err(e) = add_food(&mut editor, &meal_id).await {
                        if e.ends_session() {
                            return Err(e);
                        }
                        eprintln!("{}", e.user_message());
                    }
                }
            }
            EditorAction::RemoveFood => {
                if let Some(meal_id) = prompt_meal(editor.day(), "From which meal?")? {
                    let index = match editor.day().meal(&meal_id) {
                        Some(meal) => prompt_food(meal)?,
                        None => None,
                    };
                    if let Some(index) = index {
                        editor.remove_food(&meal_id, index);
                    }
                }
            }
            EditorAction::CopyDay => {
                let destination = prompt_day("Copy meals to which day?", editor.active_day())?;
                editor.copy_day_to(destination);
            }
            EditorAction::Micronutrients => {
                match editor.show_micronutrients().await {
                    Ok(OverlayState::Ready(values)) => display_micronutrients(values),
                    Ok(OverlayState::Failed(message)) => eprintln!("{}", message),
                    Ok(_) => {}
                    Err(e) => eprintln!("{}", e.user_message()),
                }
                editor.close_micronutrients();
            }
            EditorAction::RenamePlan => {
                let current = editor.plan().name.clone();
                let name = prompt_text("Plan name", &current)?;
                editor.set_plan_name(name);
            }
            EditorAction::Save => match editor.save().await {
                SaveStatus::Saved {
                    plan_id,
                    leave_after,
                } => {
                    println!("Plan saved (id {}).", plan_id);
                    tokio::time::sleep(leave_after).await;
                    return Ok(());
                }
                SaveStatus::Failed { message } => eprintln!("{}", message),
                _ => {}
            },
            EditorAction::Quit => {
                if prompt_yes_no("Quit without saving?", false)? {
                    return Ok(());
                }
            }
        }
    }
}

/// Run the add-food dialog for one meal; it is always closed on return.
async fn add_food(editor: &mut EditorSession, meal_id: &EntityId) -> Result<()> {
    if !editor.open_add_food(meal_id) {
        return Ok(());
    }
    let outcome = run_add_food_dialog(editor).await;
    editor.close_add_food();
    outcome
}

async fn run_add_food_dialog(editor: &mut EditorSession) -> Result<()> {
    loop {
        let Some(dialog) = editor.dialog_mut() else {
            return Ok(());
        };

        let query = prompt_query()?;
        if query.trim().is_empty() {
            return Ok(());
        }

        dialog.search_mut().set_query(query);
        match dialog.search_mut().settle().await {
            SearchPhase::Errored => {
                eprintln!("{}", dialog.search().error().unwrap_or_default());
                continue;
            }
            SearchPhase::Idle => {
                println!("Query too short.");
                continue;
            }
            _ => {}
        }

        let results = dialog.search().results().to_vec();
        if results.is_empty() {
            println!("No foods found.");
            continue;
        }
        let Some(index) = prompt_search_result(&results)? else {
            continue;
        };
        dialog.search_mut().select(index);

        let grams = match prompt_grams(dialog.grams()) {
            Ok(grams) => grams,
            Err(e) if !e.ends_session() => {
                eprintln!("{}", e.user_message());
                continue;
            }
            Err(e) => return Err(e),
        };
        dialog.set_grams(grams);
        display_dialog_preview(dialog);
        if !dialog.can_confirm() {
            println!("Grams must be greater than zero.");
            continue;
        }

        if prompt_yes_no("Add this food?", true)? {
            editor.confirm_add_food();
            return Ok(());
        }
    }
}
