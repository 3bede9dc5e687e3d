//! # Error Types
//!
//! Error taxonomy for the vault resolution engine using `thiserror`.

use std::fmt;

/// Custom result type for vaultlink operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Main error type for the vault resolution engine
#[derive(thiserror::Error, Debug)]
pub enum VaultError {
    /// No response reached the vault (connection refused, timeout, DNS)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Lock signature seen but no passphrase is on file
    #[error("Vault is locked: {message}")]
    Locked { message: String },

    /// Non-2xx response after the retry logic was exhausted
    #[error("Vault API error (status: {status}): {body}")]
    Api { status: u16, body: String },

    /// Hostname resolves to no vault item
    #[error("No vault item matches host '{hostname}'")]
    NoMatch { hostname: String },

    /// Item resolves to no usable secret
    #[error("No secret stored for item '{item_id}'")]
    NoSecret { item_id: String },

    /// Secret loaded but exposes neither username nor password
    #[error("Secret for item '{item_id}' has neither username nor password")]
    IncompleteCredential { item_id: String },

    /// Provisioning flow could not complete
    #[error("Provisioning failed: {message}")]
    Provisioning {
        message: String,
        raw: Option<serde_json::Value>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
}

/// Stable, machine-readable error category carried in response envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Locked,
    Api,
    NoMatch,
    NoSecret,
    IncompleteCredential,
    Provisioning,
    Config,
    Validation,
    Serialization,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Locked => "locked",
            ErrorKind::Api => "api",
            ErrorKind::NoMatch => "no_match",
            ErrorKind::NoSecret => "no_secret",
            ErrorKind::IncompleteCredential => "incomplete_credential",
            ErrorKind::Provisioning => "provisioning",
            ErrorKind::Config => "config",
            ErrorKind::Validation => "validation",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

impl VaultError {
    /// Create a transport error wrapping the underlying HTTP client failure
    pub fn transport(source: reqwest::Error) -> Self {
        Self::Transport {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a transport error from a message only
    pub fn transport_message<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a locked error
    pub fn locked<S: Into<String>>(message: S) -> Self {
        Self::Locked {
            message: message.into(),
        }
    }

    /// Create an API error
    pub fn api<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a no-match error
    pub fn no_match<S: Into<String>>(hostname: S) -> Self {
        Self::NoMatch {
            hostname: hostname.into(),
        }
    }

    /// Create a no-secret error
    pub fn no_secret<S: Into<String>>(item_id: S) -> Self {
        Self::NoSecret {
            item_id: item_id.into(),
        }
    }

    /// Create an incomplete-credential error
    pub fn incomplete_credential<S: Into<String>>(item_id: S) -> Self {
        Self::IncompleteCredential {
            item_id: item_id.into(),
        }
    }

    /// Create a provisioning error
    pub fn provisioning<S: Into<String>>(message: S) -> Self {
        Self::Provisioning {
            message: message.into(),
            raw: None,
        }
    }

    /// Create a provisioning error carrying the raw vault response for diagnosis
    pub fn provisioning_with_raw<S: Into<String>>(message: S, raw: serde_json::Value) -> Self {
        Self::Provisioning {
            message: message.into(),
            raw: Some(raw),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    /// Category of this error for response envelopes
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Transport { .. } => ErrorKind::Transport,
            VaultError::Locked { .. } => ErrorKind::Locked,
            VaultError::Api { .. } => ErrorKind::Api,
            VaultError::NoMatch { .. } => ErrorKind::NoMatch,
            VaultError::NoSecret { .. } => ErrorKind::NoSecret,
            VaultError::IncompleteCredential { .. } => ErrorKind::IncompleteCredential,
            VaultError::Provisioning { .. } => ErrorKind::Provisioning,
            VaultError::Config { .. } => ErrorKind::Config,
            VaultError::Validation { .. } => ErrorKind::Validation,
            VaultError::Serialization { .. } => ErrorKind::Serialization,
            VaultError::Io { .. } => ErrorKind::Io,
        }
    }

    /// HTTP status of the vault response, if the error came from one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            VaultError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the failure means "this endpoint is not usable here" rather than
    /// "the vault is unreachable or locked". Fallback chains only swallow these.
    pub fn is_endpoint_failure(&self) -> bool {
        matches!(self, VaultError::Api { .. } | VaultError::Serialization { .. })
    }
}

impl From<std::io::Error> for VaultError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            source: error,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            source: error,
            context: "JSON serialization failed".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for VaultError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = VaultError::config("Test configuration error");
        assert!(matches!(error, VaultError::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: Test configuration error");
    }

    #[test]
    fn test_api_error_carries_status_and_body() {
        let error = VaultError::api(500, "boom");
        assert_eq!(error.status_code(), Some(500));
        assert_eq!(error.to_string(), "Vault API error (status: 500): boom");
        assert_eq!(error.kind(), ErrorKind::Api);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(VaultError::locked("x").kind(), ErrorKind::Locked);
        assert_eq!(VaultError::no_match("a.com").kind(), ErrorKind::NoMatch);
        assert_eq!(VaultError::no_secret("i").kind(), ErrorKind::NoSecret);
        assert_eq!(
            VaultError::incomplete_credential("i").kind(),
            ErrorKind::IncompleteCredential
        );
        assert_eq!(VaultError::transport_message("down").kind(), ErrorKind::Transport);
        assert_eq!(VaultError::provisioning("x").kind(), ErrorKind::Provisioning);
    }

    #[test]
    fn test_endpoint_failures() {
        assert!(VaultError::api(404, "not found").is_endpoint_failure());
        assert!(!VaultError::locked("locked").is_endpoint_failure());
        assert!(!VaultError::transport_message("refused").is_endpoint_failure());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::IncompleteCredential).unwrap();
        assert_eq!(json, "\"incomplete_credential\"");
        assert_eq!(ErrorKind::NoMatch.to_string(), "no_match");
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: VaultError = io_error.into();
        assert!(matches!(error, VaultError::Io { .. }));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: VaultError = json_error.into();
        assert!(matches!(error, VaultError::Serialization { .. }));
    }

    #[test]
    fn test_provisioning_keeps_raw_response() {
        let raw = serde_json::json!({"blob_hash": "abc"});
        let error = VaultError::provisioning_with_raw("no item id", raw.clone());
        match error {
            VaultError::Provisioning { raw: Some(r), .. } => assert_eq!(r, raw),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
