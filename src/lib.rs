pub mod app;
pub mod config;
pub mod editor;
pub mod errors;
pub mod handlers;
pub mod images;
pub mod models;
pub mod notify;
pub mod projections;
pub mod read_state;
pub mod state;
pub mod storage;

pub use app::router;
pub use config::Config;
pub use editor::EditorState;
pub use state::AppState;
pub use storage::{FileStore, RecordStore};
