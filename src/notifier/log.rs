//! Notifier that only writes to the log.

use async_trait::async_trait;
use crate::notifier::{Notifier, NotifyError};

/// Used when no external channel is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(message = %text, "Notification");
        Ok(())
    }
}
