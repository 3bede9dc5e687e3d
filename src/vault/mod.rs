//! # Vault Client
//!
//! Resolves and provisions website credentials held by a local vault service.
//!
//! The vault speaks a loosely specified JSON-over-HTTP dialect: depending on the
//! deployment, the same record may arrive as a positional row, a keyed object
//! or a bare identifier, and some endpoints may be missing entirely. This
//! module hides that behind a small set of components:
//!
//! - [`transport`]: HTTP calls with transparent lock recovery
//! - [`normalize`]: shape-independent field extraction
//! - [`matcher`]: hostname to item matching
//! - [`resolver`]: hostname to credential resolution
//! - [`provision`]: creating alias, identity and secret for a new site
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vaultlink::config::VaultClientConfig;
//! use vaultlink::unlock::MemoryUnlockStore;
//! use vaultlink::vault::{SecretResolver, VaultTransport};
//!
//! let transport = VaultTransport::new(&VaultClientConfig::default(), Arc::new(MemoryUnlockStore::new()))?;
//! let credential = SecretResolver::new(transport).retrieve("example.com").await?;
//! ```

pub mod matcher;
pub mod normalize;
pub mod provision;
pub mod resolver;
pub mod transport;
pub mod types;

pub use matcher::{find_any_field_match, find_best_match, find_match_with_fallback, MatchTier};
pub use provision::CredentialProvisioner;
pub use resolver::SecretResolver;
pub use transport::{ParsedBody, VaultTransport};
pub use types::{
    AliasMode, Credential, Identifier, MatchResult, ProvisionedCredential, SecretString,
    SecretType, VaultItem, VaultSecret,
};
