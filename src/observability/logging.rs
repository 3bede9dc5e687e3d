//! # Structured Logging
//!
//! `tracing-subscriber` setup plus span macros that tag each logical vault
//! operation with an `operation_id`, so the requests issued by one retrieve or
//! provision run can be grouped in the logs.

use tracing_subscriber::{fmt, EnvFilter};

/// Create a tracing span for one logical vault operation.
///
/// ```rust,ignore
/// let span = vault_span!("retrieve", hostname = %hostname);
/// ```
#[macro_export]
macro_rules! vault_span {
    ($operation:expr) => {
        tracing::info_span!(
            "vault_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "vault_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for one inbound request on the stdio server.
#[macro_export]
macro_rules! request_span {
    ($action:expr) => {
        tracing::info_span!(
            "request",
            action = %$action,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($action:expr, $($field:tt)*) => {
        tracing::info_span!(
            "request",
            action = %$action,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`. A subscriber that is already installed (integration tests) is
/// left in place.
pub fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false);
    let installed = if json { builder.json().try_init() } else { builder.try_init() };

    if let Err(e) = installed {
        tracing::debug!(error = %e, "Global subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = vault_span!("retrieve");
        let _span = vault_span!("retrieve", hostname = "example.com");
        let _span = request_span!("health_check");
        let _span = request_span!("provision", hostname = "example.com");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false, false);
        init_logging(true, true);
    }
}
