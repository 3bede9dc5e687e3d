//! Hostname to credential resolution.
//!
//! Deployments of the vault disagree on which endpoints exist, so most lookups
//! here are probes: try the preferred endpoint, fall back to the next one, and
//! treat an endpoint that errors as "not available here". Only endpoint
//! failures ([`VaultError::is_endpoint_failure`]) are swallowed. A locked vault
//! or an unreachable vault is never an availability question and always
//! propagates.

use serde_json::Value;
use tracing::{debug, field, instrument, warn};

use super::matcher::find_match_with_fallback;
use super::normalize::{
    list_rows, normalize_items, normalize_secret, normalize_secrets, pick_username,
};
use super::transport::VaultTransport;
use super::types::{Credential, Identifier, VaultSecret};
use crate::errors::{Result, VaultError};

/// Item detail endpoints probed for a username, in order.
const USERNAME_PROBES: &[&str] = &["/identity", "/items", "/item"];

/// Resolves existing credentials from the vault
#[derive(Debug, Clone)]
pub struct SecretResolver {
    transport: VaultTransport,
}

impl SecretResolver {
    pub fn new(transport: VaultTransport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &VaultTransport {
        &self.transport
    }

    /// GET a path, mapping endpoint failures to `None`.
    async fn probe(&self, path: &str) -> Result<Option<Value>> {
        match self.transport.get(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_endpoint_failure() => {
                debug!(path = %path, error = %e, "Probe endpoint unavailable");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// GET a path, mapping every failure to `None`.
    async fn probe_lenient(&self, path: &str) -> Option<Value> {
        match self.transport.get(path).await {
            Ok(value) => Some(value),
            Err(e) => {
                if e.is_endpoint_failure() {
                    debug!(path = %path, error = %e, "Probe endpoint unavailable");
                } else {
                    warn!(path = %path, error = %e, "Probe failed");
                }
                None
            }
        }
    }

    /// All secrets linked to an item.
    ///
    /// The per-item endpoint is authoritative when it answers with a list, even
    /// an empty one. Otherwise the global listing is filtered by item reference.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn fetch_secrets_for_item(&self, item_id: &Identifier) -> Result<Vec<VaultSecret>> {
        let per_item = format!("/items/{}/secrets", item_id);
        if let Some(body) = self.probe(&per_item).await? {
            if let Some(rows) = list_rows(&body) {
                debug!(count = rows.len(), "Secrets from per-item endpoint");
                return Ok(normalize_secrets(rows));
            }
            debug!("Per-item secrets endpoint returned a non-list body, trying /secrets");
        }

        if let Some(body) = self.probe("/secrets").await? {
            if let Some(rows) = list_rows(&body) {
                let secrets: Vec<VaultSecret> = normalize_secrets(rows)
                    .into_iter()
                    .filter(|secret| secret.item_id.as_ref() == Some(item_id))
                    .collect();
                debug!(count = secrets.len(), "Secrets from global listing");
                return Ok(secrets);
            }
        }

        Ok(Vec::new())
    }

    /// Prefer a password secret, else the first one.
    pub fn select_secret(secrets: Vec<VaultSecret>) -> Option<VaultSecret> {
        let index = secrets.iter().position(VaultSecret::is_password).unwrap_or(0);
        secrets.into_iter().nth(index)
    }

    /// Fill a metadata-only listing record from `/secret/{id}`.
    ///
    /// Any failure keeps the listing record as it was.
    pub async fn load_secret_detail(&self, secret: VaultSecret) -> VaultSecret {
        if secret.password.is_some() {
            return secret;
        }
        let Some(secret_id) = secret.secret_id.clone() else {
            return secret;
        };

        match self.probe_lenient(&format!("/secret/{}", secret_id)).await {
            Some(body) => match normalize_secret(&body) {
                Some(detail) => secret.merge_detail(detail),
                None => secret,
            },
            None => secret,
        }
    }

    /// Username for a credential: the secret's own, else the first identity or
    /// item detail endpoint that exposes one.
    pub async fn resolve_username(
        &self,
        item_id: &Identifier,
        secret: &VaultSecret,
    ) -> Option<String> {
        if let Some(username) = secret.username.as_ref().filter(|u| !u.is_empty()) {
            return Some(username.clone());
        }

        for prefix in USERNAME_PROBES {
            let path = format!("{}/{}", prefix, item_id);
            if let Some(username) = self.probe_lenient(&path).await.as_ref().and_then(pick_username)
            {
                debug!(path = %path, "Username found via detail endpoint");
                return Some(username);
            }
        }
        None
    }

    /// Resolve the stored credential for a hostname.
    #[instrument(skip(self), fields(hostname = %hostname, item_id = field::Empty))]
    pub async fn retrieve(&self, hostname: &str) -> Result<Credential> {
        let listing = self.transport.get("/items").await?;
        let items = normalize_items(&listing);
        debug!(count = items.len(), "Vault items listed");

        let (matched, tier) = find_match_with_fallback(&items, hostname)
            .ok_or_else(|| VaultError::no_match(hostname))?;
        tracing::Span::current().record("item_id", field::display(&matched.item_id));
        debug!(tier = ?tier, domain = %matched.domain, title = %matched.title, "Item matched");

        let secrets = self.fetch_secrets_for_item(&matched.item_id).await?;
        let secret = Self::select_secret(secrets)
            .ok_or_else(|| VaultError::no_secret(matched.item_id.as_str()))?;
        let secret = self.load_secret_detail(secret).await;

        let username = self.resolve_username(&matched.item_id, &secret).await;
        if username.is_none() && secret.password.is_none() {
            return Err(VaultError::incomplete_credential(matched.item_id.as_str()));
        }

        Ok(Credential { username, password: secret.password })
    }
}
