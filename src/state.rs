use crate::editor::EditorState;
use crate::notify::Notifier;
use crate::storage::RecordStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The editor mutex is also the write lock.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub editor: Arc<Mutex<EditorState>>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(store: RecordStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            editor: Arc::new(Mutex::new(EditorState::start_create())),
            notifier,
        }
    }
}
