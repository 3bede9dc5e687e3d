//! # Error Handling
//!
//! Error types for the vault resolution engine. Every failure the engine can
//! report carries a stable [`ErrorKind`] so the request router can turn it into
//! a structured envelope instead of letting it escape.

pub mod types;

pub use types::{ErrorKind, Result, VaultError};
