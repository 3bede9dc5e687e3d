//! HTTP transport to the local vault.
//!
//! Every vault request goes through [`VaultTransport::call`], which owns the
//! lock-recovery protocol:
//!
//! ```text
//! FIRST_ATTEMPT ── success ───────────────────────────────► body
//!       │ ── other error ─────────────────────────────────► ApiError
//!       │ ── lock signature ─► unlock(stored passphrase) ─┐
//!       │                      └─ no passphrase ──────────► LockedError
//! RETRY_ATTEMPT ◄─────────────────────────────────────────┘
//!       │ ── success ─────────────────────────────────────► body
//!       └─ any error ─────────────────────────────────────► ApiError
//! ```
//!
//! Network failures are never retried. The attempt counter is local to each
//! call, so concurrent calls recover independently and no call unlocks twice.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, field, instrument, trace, warn};

use crate::config::VaultClientConfig;
use crate::errors::{Result, VaultError};
use crate::unlock::{UnlockConfig, UnlockConfigStore};
use crate::vault::SecretString;

/// Phrase the vault puts in the error body when it needs re-authentication.
pub const LOCK_PHRASE: &str = "vault locked";

/// Unlock endpoint path.
pub const UNLOCK_PATH: &str = "/unlock";

/// Body of a successful vault response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Json(Value),
    Text(String),
}

impl ParsedBody {
    /// Collapse into a JSON value; raw text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            ParsedBody::Json(value) => value,
            ParsedBody::Text(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
}

impl Attempt {
    fn number(self) -> u8 {
        match self {
            Attempt::First => 1,
            Attempt::Retry => 2,
        }
    }
}

/// True when a failed response means "unlock me and ask again".
pub fn is_lock_signature(status: StatusCode, body: &str) -> bool {
    matches!(status, StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN)
        && body.to_lowercase().contains(LOCK_PHRASE)
}

/// Vault HTTP client with transparent single-retry lock recovery
#[derive(Clone)]
pub struct VaultTransport {
    client: Client,
    base_url: String,
    store: Arc<dyn UnlockConfigStore>,
}

impl std::fmt::Debug for VaultTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultTransport").field("base_url", &self.base_url).finish()
    }
}

impl VaultTransport {
    fn user_agent() -> String {
        format!("{}/{}", crate::APP_NAME, crate::VERSION)
    }

    /// Create a transport from validated configuration and an injected unlock store
    pub fn new(config: &VaultClientConfig, store: Arc<dyn UnlockConfigStore>) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(config.timeout())
            .build()
            .map_err(|e| VaultError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url: config.normalized_base_url(), store })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The injected unlock store
    pub fn store(&self) -> &Arc<dyn UnlockConfigStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue one HTTP request. No response at all is a transport error.
    async fn send_once(&self, method: &Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(VaultError::transport)
    }

    /// Issue a vault request, recovering once from a lock signature.
    #[instrument(skip(self, body), fields(method = %method, path = %path, attempts = field::Empty))]
    pub async fn call(&self, path: &str, method: Method, body: Option<&Value>) -> Result<ParsedBody> {
        let mut attempt = Attempt::First;

        loop {
            let response = self.send_once(&method, path, body).await?;
            let status = response.status();
            debug!(status = %status, attempt = attempt.number(), "Vault response");

            if status.is_success() {
                tracing::Span::current().record("attempts", attempt.number());
                return Self::parse_success(response).await;
            }

            let error_text =
                response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
            trace!("Error response:\n{}", error_text);

            if attempt == Attempt::First && is_lock_signature(status, &error_text) {
                warn!(status = %status, "Vault reported locked, attempting stored-passphrase unlock");
                self.recover_from_lock().await?;
                attempt = Attempt::Retry;
                continue;
            }

            tracing::Span::current().record("attempts", attempt.number());
            return Err(VaultError::api(status.as_u16(), error_text));
        }
    }

    /// GET a path and return its body as JSON.
    pub async fn get(&self, path: &str) -> Result<Value> {
        Ok(self.call(path, Method::GET, None).await?.into_value())
    }

    /// POST a JSON body to a path and return the response as JSON.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        Ok(self.call(path, Method::POST, Some(body)).await?.into_value())
    }

    async fn parse_success(response: Response) -> Result<ParsedBody> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));

        let body = response.text().await.map_err(VaultError::transport)?;
        trace!("Response body:\n{}", body);

        if is_json && !body.trim().is_empty() {
            let value = serde_json::from_str(&body).map_err(|e| VaultError::Serialization {
                source: e,
                context: "Vault declared JSON but sent an unparseable body".to_string(),
            })?;
            Ok(ParsedBody::Json(value))
        } else {
            Ok(ParsedBody::Text(body))
        }
    }

    /// Unlock with the stored passphrase. Never retried.
    async fn recover_from_lock(&self) -> Result<()> {
        let config = self.store.load().await?;
        let Some(password) = config.password.as_ref().filter(|p| !p.is_empty()) else {
            return Err(VaultError::locked(
                "No stored passphrase; unlock the vault interactively first",
            ));
        };

        self.post_unlock(password, config.use_strong_hash).await?;
        debug!("Vault unlocked with stored passphrase");
        Ok(())
    }

    async fn post_unlock(&self, password: &SecretString, use_strong_hash: bool) -> Result<()> {
        // Older vault builds read the flag as `use_argon2`.
        let body = json!({
            "password": password.expose_secret(),
            "use_strong_hash": use_strong_hash,
            "use_argon2": use_strong_hash,
        });

        let response = self.send_once(&Method::POST, UNLOCK_PATH, Some(&body)).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text =
            response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
        Err(VaultError::api(status.as_u16(), error_text))
    }

    /// Explicit unlock requested by the caller.
    ///
    /// The passphrase is persisted only after the vault accepts it, so a typo
    /// never replaces a working stored passphrase.
    pub async fn unlock(&self, password: SecretString, use_strong_hash: bool) -> Result<()> {
        if password.is_empty() {
            return Err(VaultError::validation_field("Passphrase cannot be empty", "password"));
        }

        self.post_unlock(&password, use_strong_hash).await?;
        self.store.save(&UnlockConfig { password: Some(password), use_strong_hash }).await?;
        debug!("Vault unlocked and passphrase stored");
        Ok(())
    }

    /// Reachability check. Runs through [`call`](Self::call), so a locked vault
    /// with a stored passphrase still reports healthy.
    pub async fn ping(&self) -> Result<()> {
        self.call("/items", Method::GET, None).await.map(|_| ())
    }

    /// Lock the vault. The stored passphrase is left untouched.
    pub async fn lock(&self) -> Result<()> {
        self.call("/lock", Method::POST, None).await.map(|_| ())
    }
}
