//! Unlock passphrase storage.
//!
//! The transport needs the vault passphrase to recover from a lock signature,
//! but it never owns it. The caller injects an [`UnlockConfigStore`] and decides
//! its lifecycle: the record is written only on an explicit unlock request and
//! is never cleared by the engine.
//!
//! # Backends
//!
//! - [`MemoryUnlockStore`]: process-local, used by tests and the stdio server
//! - [`FileUnlockStore`]: a small JSON record on disk, used by the CLI so that
//!   `unlock` and `retrieve` can run as separate invocations

pub mod file;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::Result;
use crate::vault::SecretString;

pub use file::FileUnlockStore;

/// Persisted record key for the passphrase.
pub const PASSWORD_KEY: &str = "vault_password";

/// Persisted record key for the hashing preference.
pub const STRONG_HASH_KEY: &str = "use_strong_hash";

/// Passphrase and hashing preference used to unlock the vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockConfig {
    #[serde(rename = "vault_password", default)]
    pub password: Option<SecretString>,

    #[serde(rename = "use_strong_hash", default = "default_strong_hash")]
    pub use_strong_hash: bool,
}

fn default_strong_hash() -> bool {
    true
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self { password: None, use_strong_hash: default_strong_hash() }
    }
}

impl UnlockConfig {
    /// Config carrying a passphrase.
    pub fn new(password: impl Into<SecretString>, use_strong_hash: bool) -> Self {
        Self { password: Some(password.into()), use_strong_hash }
    }

    /// True when a non-empty passphrase is on file.
    pub fn has_password(&self) -> bool {
        self.password.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Get/set access to the stored unlock record.
///
/// Implementations must be safe under concurrent reads: independent top-level
/// requests may recover from a lock at the same time.
#[async_trait]
pub trait UnlockConfigStore: Send + Sync {
    /// Read the current record. A missing record is the default (no passphrase).
    async fn load(&self) -> Result<UnlockConfig>;

    /// Replace the stored record.
    async fn save(&self, config: &UnlockConfig) -> Result<()>;
}

/// In-memory unlock store.
#[derive(Debug, Default)]
pub struct MemoryUnlockStore {
    inner: RwLock<UnlockConfig>,
}

impl MemoryUnlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a passphrase.
    pub fn with_config(config: UnlockConfig) -> Self {
        Self { inner: RwLock::new(config) }
    }
}

#[async_trait]
impl UnlockConfigStore for MemoryUnlockStore {
    async fn load(&self) -> Result<UnlockConfig> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, config: &UnlockConfig) -> Result<()> {
        *self.inner.write().await = config.clone();
        Ok(())
    }
}
