//! # Configuration Settings
//!
//! Defines the configuration structure for the vault client.

use crate::errors::{Result, VaultError};
use crate::vault::AliasMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use super::{
    ENV_ALIAS_MODE, ENV_BASE_URL, ENV_PASSWORD_LENGTH, ENV_TIMEOUT_SECONDS, ENV_UNLOCK_STORE,
};

/// Default vault address: the local vault service on loopback
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Vault client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VaultClientConfig {
    /// Base URL of the vault HTTP API
    #[validate(length(min = 1, message = "Base URL cannot be empty"))]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Timeout must be between 1 and 300 seconds"
    ))]
    pub timeout_seconds: u64,

    /// Where the unlock passphrase record is persisted (None = in-memory only)
    pub unlock_store_path: Option<PathBuf>,

    /// Alias mode used when the caller does not choose one
    pub default_alias_mode: AliasMode,

    /// Password length used when the caller does not choose one
    #[validate(range(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128"
    ))]
    pub default_password_length: usize,
}

impl Default for VaultClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            unlock_store_path: None,
            default_alias_mode: AliasMode::Word,
            default_password_length: 16,
        }
    }
}

impl VaultClientConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(VaultError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Checks the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            VaultError::validation_field(format!("Invalid base URL: {}", e), "base_url")
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(VaultError::validation_field(
                "Base URL must use http:// or https://",
                "base_url",
            ));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url = std::env::var(ENV_BASE_URL).unwrap_or(defaults.base_url);

        let timeout_seconds = match std::env::var(ENV_TIMEOUT_SECONDS) {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| VaultError::config(format!("Invalid {}: {}", ENV_TIMEOUT_SECONDS, e)))?,
            Err(_) => defaults.timeout_seconds,
        };

        let unlock_store_path = std::env::var(ENV_UNLOCK_STORE).ok().map(PathBuf::from);

        let default_alias_mode = match std::env::var(ENV_ALIAS_MODE) {
            Ok(raw) => raw.parse::<AliasMode>()?,
            Err(_) => defaults.default_alias_mode,
        };

        let default_password_length = match std::env::var(ENV_PASSWORD_LENGTH) {
            Ok(raw) => raw.parse::<usize>().map_err(|e| {
                VaultError::config(format!("Invalid {}: {}", ENV_PASSWORD_LENGTH, e))
            })?,
            Err(_) => defaults.default_password_length,
        };

        let config = Self {
            base_url,
            timeout_seconds,
            unlock_store_path,
            default_alias_mode,
            default_password_length,
        };
        config.validate()?;
        Ok(config)
    }
}
