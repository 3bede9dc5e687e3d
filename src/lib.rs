//! # vaultlink
//!
//! Client engine for a local credential vault: resolves a hostname to a stored
//! username/password pair and provisions new credentials, over the vault's
//! JSON-over-HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! CLI / stdio server → VaultRouter → SecretResolver ─┐
//!                                  → CredentialProvisioner ─┤→ VaultTransport → vault
//!                                                            │        ↑
//!                                  ResponseNormalizer, ItemMatcher   UnlockConfigStore
//! ```
//!
//! ## Core Components
//!
//! - **Transport**: reqwest client with one-shot lock recovery using a stored passphrase
//! - **Normalizer**: reads positional rows, keyed objects and bare identifiers alike
//! - **Matcher**: tiered hostname to item matching
//! - **Resolver / Provisioner**: retrieval and creation flows with endpoint fallbacks
//! - **Router**: tagged requests in, `{"ok": ...}` envelopes out
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vaultlink::{config::VaultClientConfig, router::VaultRouter, unlock::MemoryUnlockStore};
//!
//! #[tokio::main]
//! async fn main() -> vaultlink::Result<()> {
//!     let config = VaultClientConfig::from_env()?;
//!     let router = VaultRouter::new(&config, Arc::new(MemoryUnlockStore::new()))?;
//!     let credential = router.retrieve("example.com").await?;
//!     println!("{:?}", credential.username);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod router;
pub mod unlock;
pub mod vault;

// Re-export commonly used types and traits
pub use config::VaultClientConfig;
pub use errors::{ErrorKind, Result, VaultError};
pub use router::{Request, Response, VaultRouter};
pub use unlock::{FileUnlockStore, MemoryUnlockStore, UnlockConfig, UnlockConfigStore};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
