mod controller;

pub use controller::{FoodSearchController, SearchPhase};
