//! # Request Router
//!
//! The caller-facing surface. Each operation is available as a typed method
//! returning `Result`, and [`VaultRouter::handle`] maps a tagged [`Request`] to
//! a [`Response`] envelope without ever returning an error: every failure,
//! including a malformed request, becomes `{"ok": false, ...}`.

pub mod envelope;

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn, Instrument};

use crate::config::VaultClientConfig;
use crate::errors::Result;
use crate::observability::{check_vault, HealthReport};
use crate::unlock::UnlockConfigStore;
use crate::vault::{
    AliasMode, Credential, CredentialProvisioner, ProvisionedCredential, SecretResolver,
    SecretString, VaultTransport,
};

pub use envelope::{ErrorBody, Request, Response};

/// Dispatches caller requests to the resolver, provisioner and transport
#[derive(Debug, Clone)]
pub struct VaultRouter {
    transport: VaultTransport,
    resolver: SecretResolver,
    provisioner: CredentialProvisioner,
    default_mode: AliasMode,
    default_password_length: usize,
}

impl VaultRouter {
    pub fn new(config: &VaultClientConfig, store: Arc<dyn UnlockConfigStore>) -> Result<Self> {
        let transport = VaultTransport::new(config, store)?;
        Ok(Self {
            resolver: SecretResolver::new(transport.clone()),
            provisioner: CredentialProvisioner::new(transport.clone()),
            transport,
            default_mode: config.default_alias_mode,
            default_password_length: config.default_password_length,
        })
    }

    pub fn transport(&self) -> &VaultTransport {
        &self.transport
    }

    pub async fn unlock(&self, password: SecretString, use_strong_hash: bool) -> Result<()> {
        self.transport.unlock(password, use_strong_hash).await
    }

    pub async fn lock(&self) -> Result<()> {
        self.transport.lock().await
    }

    /// Provision with the configured defaults for anything not given.
    pub async fn provision(
        &self,
        hostname: &str,
        display_name: Option<&str>,
        password_length: Option<usize>,
        mode: Option<AliasMode>,
    ) -> Result<ProvisionedCredential> {
        let display_name = display_name.filter(|n| !n.trim().is_empty()).unwrap_or(hostname);
        self.provisioner
            .provision(
                hostname,
                display_name,
                password_length.unwrap_or(self.default_password_length),
                mode.unwrap_or(self.default_mode),
            )
            .await
    }

    pub async fn retrieve(&self, hostname: &str) -> Result<Credential> {
        self.resolver.retrieve(hostname).await
    }

    pub async fn health_check(&self) -> Result<HealthReport> {
        check_vault(&self.transport).await
    }

    /// Handle one request, producing an envelope.
    pub async fn handle(&self, request: Request) -> Response {
        let action = request.action();
        let span = crate::request_span!(action);

        let response = Response::from(self.dispatch(request).instrument(span).await);
        match &response.error {
            Some(error) => warn!(action = %action, kind = %error.kind, "Request failed"),
            None => info!(action = %action, "Request completed"),
        }
        response
    }

    /// Handle one JSON-encoded request.
    pub async fn handle_json(&self, raw: &str) -> Response {
        match serde_json::from_str::<Request>(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "Malformed request");
                Response::failure(&e.into())
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Value> {
        match request {
            Request::Unlock { password, use_strong_hash } => {
                self.unlock(password, use_strong_hash).await?;
                Ok(json!({ "unlocked": true }))
            }
            Request::Lock => {
                self.lock().await?;
                Ok(json!({ "locked": true }))
            }
            Request::Provision { hostname, display_name, password_length, mode } => {
                let provisioned = self
                    .provision(&hostname, display_name.as_deref(), password_length, mode)
                    .await?;
                Ok(provisioned_json(&provisioned))
            }
            Request::Retrieve { hostname } => {
                let credential = self.retrieve(&hostname).await?;
                Ok(credential_json(&credential))
            }
            Request::HealthCheck => Ok(serde_json::to_value(self.health_check().await?)?),
        }
    }
}

/// Wire form of a provisioned credential. The password is revealed here on purpose.
pub fn provisioned_json(provisioned: &ProvisionedCredential) -> Value {
    json!({
        "alias": provisioned.alias,
        "username": provisioned.username,
        "password": provisioned.password.expose_secret(),
        "item_id": provisioned.item_id,
        "secret_id": provisioned.secret_id,
    })
}

/// Wire form of a resolved credential. The password is revealed here on purpose.
pub fn credential_json(credential: &Credential) -> Value {
    json!({
        "username": credential.username,
        "password": credential.password.as_ref().map(SecretString::expose_secret),
    })
}
