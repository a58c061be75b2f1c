pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod interface;
pub mod models;
pub mod nutrition;
pub mod overlay;
pub mod search;
pub mod state;

pub use error::{PlanError, Result};
pub use models::{Day, FoodEntry, Meal, Plan, WeekPlan};
