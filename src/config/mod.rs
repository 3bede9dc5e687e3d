//! # Configuration Management
//!
//! Client-side configuration for talking to the local vault. Values come from
//! defaults, then `VAULTLINK_*` environment variables, then CLI flags.

pub mod settings;

pub use settings::{VaultClientConfig, DEFAULT_BASE_URL};

/// Vault base URL override
pub const ENV_BASE_URL: &str = "VAULTLINK_BASE_URL";

/// Request timeout override, in seconds
pub const ENV_TIMEOUT_SECONDS: &str = "VAULTLINK_TIMEOUT_SECONDS";

/// Path of the JSON file holding the unlock passphrase record
pub const ENV_UNLOCK_STORE: &str = "VAULTLINK_UNLOCK_STORE";

/// Default alias mode (`word`, `uuid`, `username`)
pub const ENV_ALIAS_MODE: &str = "VAULTLINK_ALIAS_MODE";

/// Default generated password length
pub const ENV_PASSWORD_LENGTH: &str = "VAULTLINK_PASSWORD_LENGTH";

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Env vars are process-global, so every env-dependent assertion lives in one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var(ENV_BASE_URL);
        env::remove_var(ENV_TIMEOUT_SECONDS);
        env::remove_var(ENV_UNLOCK_STORE);
        env::remove_var(ENV_ALIAS_MODE);
        env::remove_var(ENV_PASSWORD_LENGTH);

        let config = VaultClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.unlock_store_path.is_none());

        env::set_var(ENV_BASE_URL, "http://localhost:6000");
        env::set_var(ENV_TIMEOUT_SECONDS, "5");
        env::set_var(ENV_ALIAS_MODE, "uuid");
        env::set_var(ENV_PASSWORD_LENGTH, "24");

        let config = VaultClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:6000");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.default_alias_mode, crate::vault::AliasMode::Uuid);
        assert_eq!(config.default_password_length, 24);

        env::set_var(ENV_TIMEOUT_SECONDS, "soon");
        assert!(VaultClientConfig::from_env().is_err());

        env::remove_var(ENV_BASE_URL);
        env::remove_var(ENV_TIMEOUT_SECONDS);
        env::remove_var(ENV_ALIAS_MODE);
        env::remove_var(ENV_PASSWORD_LENGTH);
    }
}
