use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// DietBuilder: a weekly diet plan editor backed by a local food catalog.
#[derive(Parser, Debug)]
#[command(name = "diet_builder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to a TOML config file (overrides DIET_BUILDER_CONFIG).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the saved plans JSON file.
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Path to the food catalog CSV file.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved plans.
    List,

    /// Print a saved plan with its daily totals.
    Show {
        /// Id of the plan.
        id: i64,
    },

    /// Delete a saved plan.
    Delete {
        /// Id of the plan.
        id: i64,
    },

    /// Search the food catalog.
    Search {
        /// Free-text query.
        query: String,
    },

    /// Edit a plan interactively (a new one when no id is given).
    Edit {
        /// Id of the plan to load.
        #[arg(long)]
        id: Option<i64>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Edit { id: None }
    }
}
