use crate::errors::NotifyError;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Delivers system-level alerts.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes alerts to the log instead of a desktop notification centre.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(title = %notification.title, body = %notification.body, "notification");
        Ok(())
    }
}

/// Failures are logged and swallowed.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: Notification) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        if let Err(err) = notifier.notify(&notification) {
            warn!("dropping notification '{}': {err}", notification.title);
        }
    })
}
