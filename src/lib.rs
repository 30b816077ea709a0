//! DNS failover daemon library.

pub mod config;
pub mod pool;
pub mod health;
pub mod failover;
pub mod store;
pub mod dns;
pub mod notifier;
pub mod reconcile;
pub mod lifecycle;
pub mod observability;
pub mod admin;

pub use config::schema::DaemonConfig;
pub use failover::FailoverEngine;
pub use lifecycle::Shutdown;
pub use reconcile::Reconciler;
