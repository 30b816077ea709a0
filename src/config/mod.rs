//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DaemonConfig (validated, immutable)
//!     → credentials.rs (secrets from environment only)
//!     → handed by value to each subsystem at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets never live in the config file, only the names of env vars

pub mod credentials;
pub mod loader;
pub mod schema;
pub mod validation;

pub use credentials::Credentials;
pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, CloudflareConfig, DaemonConfig, FailoverConfig, LatencyMethod, LogFormat,
    NotifierConfig, ObservabilityConfig, PoolEntry, ProbeConfig, StateConfig,
};
