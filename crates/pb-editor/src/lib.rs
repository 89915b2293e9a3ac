pub mod action;
pub mod drop;
pub mod history;
pub mod state;
pub mod store;

pub use action::EditorAction;
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use state::{EditorState, ResponsiveMode, reduce};
pub use store::{DocumentStore, SharedStore, StoreConfig};
