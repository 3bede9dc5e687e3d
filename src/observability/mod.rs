//! # Observability
//!
//! Structured logging setup, span macros and the vault health check.
//!
//! Logs always go to stderr. Stdout belongs to command output and, in `serve`
//! mode, to the JSON message stream.

pub mod health;
pub mod logging;

pub use health::{check_vault, HealthReport};
pub use logging::init_logging;
