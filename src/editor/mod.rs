pub mod dialog;
pub mod mutations;
pub mod reorder;
pub mod session;

pub use dialog::AddFoodDialog;
pub use reorder::{reorder, DropGesture};
pub use session::{EditorDeps, EditorSession};
