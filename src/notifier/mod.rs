//! Operator notification subsystem.
//!
//! # Design Decisions
//! - Delivery is best-effort: callers log failures and move on
//! - One aggregated message per batch, split only to fit channel limits

pub mod log;
pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

pub use self::log::LogNotifier;
pub use telegram::TelegramNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Delivers text to an operator channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
