pub mod prompts;
pub mod render;

pub use prompts::{
    prompt_action, prompt_day, prompt_food, prompt_grams, prompt_meal, prompt_meal_move,
    prompt_query, prompt_search_result, prompt_text, prompt_yes_no, EditorAction,
};
pub use render::{
    display_day, display_dialog_preview, display_micronutrients, display_plan,
    display_plan_list, display_search_results, format_macros, search_result_label,
};
