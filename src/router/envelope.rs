//! Request and response shapes for the caller surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorKind, VaultError};
use crate::vault::{AliasMode, SecretString};

fn default_strong_hash() -> bool {
    true
}

/// One caller request, tagged by `action`.
///
/// ```json
/// {"action": "retrieve", "hostname": "example.com"}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Unlock {
        password: SecretString,
        #[serde(default = "default_strong_hash")]
        use_strong_hash: bool,
    },
    Lock,
    Provision {
        hostname: String,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        password_length: Option<usize>,
        #[serde(default)]
        mode: Option<AliasMode>,
    },
    Retrieve {
        hostname: String,
    },
    HealthCheck,
}

impl Request {
    /// The `action` tag, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Request::Unlock { .. } => "unlock",
            Request::Lock => "lock",
            Request::Provision { .. } => "provision",
            Request::Retrieve { .. } => "retrieve",
            Request::HealthCheck => "health_check",
        }
    }
}

/// Error half of the envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl From<&VaultError> for ErrorBody {
    fn from(error: &VaultError) -> Self {
        let raw = match error {
            VaultError::Provisioning { raw, .. } => raw.clone(),
            _ => None,
        };
        Self { kind: error.kind(), message: error.to_string(), status: error.status_code(), raw }
    }
}

/// `{"ok": true, "data": ...}` or `{"ok": false, "error": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn success(data: Value) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    pub fn failure(error: &VaultError) -> Self {
        Self { ok: false, data: None, error: Some(ErrorBody::from(error)) }
    }

    /// Error category, when this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

impl From<crate::errors::Result<Value>> for Response {
    fn from(result: crate::errors::Result<Value>) -> Self {
        match result {
            Ok(data) => Response::success(data),
            Err(error) => Response::failure(&error),
        }
    }
}
