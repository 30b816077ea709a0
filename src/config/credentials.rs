//! Secrets loading.
//!
//! # Security
//! - Tokens are read ONLY from environment variables named in the config
//! - Tokens are never logged or serialized

use std::fmt;
use crate::config::loader::ConfigError;
use crate::config::schema::DaemonConfig;

/// Secrets resolved at startup.
#[derive(Clone)]
pub struct Credentials {
    pub cloudflare_token: String,
    /// Present when the notifier is enabled.
    pub telegram_token: Option<String>,
    /// Present when the admin API is enabled.
    pub admin_key: Option<String>,
}

impl Credentials {
    /// Resolve every credential the config needs from the process environment.
    pub fn from_env(config: &DaemonConfig) -> Result<Self, ConfigError> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary lookup.
    pub fn resolve<F>(config: &DaemonConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingCredential(name.to_string()))
        };

        let cloudflare_token = require(&config.cloudflare.api_token_env)?;
        let telegram_token = if config.notifier.enabled {
            Some(require(&config.notifier.bot_token_env)?)
        } else {
            None
        };
        let admin_key = if config.admin.enabled {
            Some(require(&config.admin.api_key_env)?)
        } else {
            None
        };

        Ok(Self {
            cloudflare_token,
            telegram_token,
            admin_key,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cloudflare_token", &"<redacted>")
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "<redacted>"))
            .field("admin_key", &self.admin_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
