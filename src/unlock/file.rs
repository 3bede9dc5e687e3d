//! JSON-file unlock store.
//!
//! The record is a flat object keyed by [`PASSWORD_KEY`] and [`STRONG_HASH_KEY`].
//! On unix the file is created with mode `0600`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{UnlockConfig, UnlockConfigStore, PASSWORD_KEY, STRONG_HASH_KEY};
use crate::errors::{Result, VaultError};
use crate::vault::SecretString;

/// Unlock store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileUnlockStore {
    path: PathBuf,
}

impl FileUnlockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `$HOME/.vaultlink/unlock.json`, or a relative path when HOME is unset.
    pub fn default_path() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".vaultlink").join("unlock.json"),
            None => PathBuf::from(".vaultlink").join("unlock.json"),
        }
    }

    fn parse(raw: &str) -> Result<UnlockConfig> {
        serde_json::from_str(raw).map_err(|e| VaultError::Serialization {
            source: e,
            context: "Unlock store is not a valid unlock record".to_string(),
        })
    }

    async fn write_restricted(&self, contents: &[u8]) -> std::io::Result<()> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, contents).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await
    }
}

#[async_trait]
impl UnlockConfigStore for FileUnlockStore {
    async fn load(&self) -> Result<UnlockConfig> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Self::parse(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No unlock record on file");
                Ok(UnlockConfig::default())
            }
            Err(e) => Err(VaultError::io(
                e,
                format!("Failed to read unlock store at {}", self.path.display()),
            )),
        }
    }

    async fn save(&self, config: &UnlockConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                VaultError::io(e, format!("Failed to create {}", parent.display()))
            })?;
        }

        let record = json!({
            PASSWORD_KEY: config.password.as_ref().map(SecretString::expose_secret),
            STRONG_HASH_KEY: config.use_strong_hash,
        });
        let contents = serde_json::to_vec_pretty(&record)?;

        self.write_restricted(&contents).await.map_err(|e| {
            VaultError::io(e, format!("Failed to write unlock store at {}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), "Unlock record saved");
        Ok(())
    }
}
