//! New-credential provisioning.
//!
//! A provisioning run creates, in order: an alias, a password, a username, an
//! identity for the hostname, and a password secret linked to that identity.
//! The steps are sequential because each feeds the next.

use serde_json::{json, Value};
use tracing::{debug, field, info, instrument, warn};

use super::matcher::find_best_match;
use super::normalize::{
    normalize_items, pick_identifier, pick_identifier_preferring, pick_string,
};
use super::transport::VaultTransport;
use super::types::{AliasMode, Identifier, ProvisionedCredential, SecretString};
use crate::errors::{Result, VaultError};

/// Shortest password the vault will generate.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest password accepted for provisioning.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Creates aliases, identities and secrets for new sites
#[derive(Debug, Clone)]
pub struct CredentialProvisioner {
    transport: VaultTransport,
}

impl CredentialProvisioner {
    pub fn new(transport: VaultTransport) -> Self {
        Self { transport }
    }

    fn validate_length(password_length: usize) -> Result<()> {
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password_length) {
            return Err(VaultError::validation_field(
                format!(
                    "Password length must be between {} and {}, got {}",
                    MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, password_length
                ),
                "password_length",
            ));
        }
        Ok(())
    }

    async fn create_alias(&self, hostname: &str, mode: AliasMode) -> Result<String> {
        let body = json!({
            "hostname": hostname,
            "mode": mode.as_str(),
            "note": format!("Created for {}", hostname),
        });
        let response = self.transport.post("/alias", &body).await?;
        pick_string(&response, &["alias", "email"]).ok_or_else(|| {
            VaultError::provisioning_with_raw("Alias response carried no alias", response)
        })
    }

    async fn generate_password(&self, length: usize) -> Result<SecretString> {
        let response = self.transport.post("/password", &json!({ "length": length })).await?;
        pick_string(&response, &["password"]).map(SecretString::new).ok_or_else(|| {
            VaultError::provisioning("Password response carried no password")
        })
    }

    /// Username from `/username`, then from `/alias` in username mode.
    ///
    /// Returns `None` when neither generator is available.
    async fn generate_username(&self, hostname: &str, display_name: &str) -> Result<Option<String>> {
        let body = json!({ "hostname": hostname, "name": display_name });
        match self.transport.post("/username", &body).await {
            Ok(response) => {
                if let Some(username) = pick_string(&response, &["username", "alias", "email"]) {
                    return Ok(Some(username));
                }
                debug!("Username response carried no username");
            }
            Err(e) if e.is_endpoint_failure() => {
                debug!(error = %e, "Username endpoint unavailable, trying alias generator");
            }
            Err(e) => return Err(e),
        }

        let body = json!({
            "hostname": hostname,
            "mode": AliasMode::Username.as_str(),
            "note": format!("Username for {}", display_name),
        });
        match self.transport.post("/alias", &body).await {
            Ok(response) => Ok(pick_string(&response, &["username", "alias", "email"])),
            Err(e) if e.is_endpoint_failure() => {
                warn!(error = %e, "No username generator available");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Item id for a freshly created identity.
    ///
    /// Some vaults do not echo the id, so the item listing is searched for the
    /// hostname as a second chance.
    async fn identity_item_id(&self, hostname: &str, identity: Value) -> Result<Identifier> {
        if let Some(id) = pick_identifier(&identity) {
            return Ok(id);
        }

        debug!("Identity response carried no id, locating item by hostname");
        let listing = self.transport.get("/items").await?;
        match find_best_match(&normalize_items(&listing), hostname) {
            Some(matched) => Ok(matched.item_id),
            None => Err(VaultError::provisioning_with_raw(
                format!("Could not determine the item id for new identity '{}'", hostname),
                identity,
            )),
        }
    }

    /// Provision a new credential for `hostname`.
    #[instrument(
        skip(self, display_name),
        fields(hostname = %hostname, mode = %mode, item_id = field::Empty)
    )]
    pub async fn provision(
        &self,
        hostname: &str,
        display_name: &str,
        password_length: usize,
        mode: AliasMode,
    ) -> Result<ProvisionedCredential> {
        Self::validate_length(password_length)?;
        if hostname.trim().is_empty() {
            return Err(VaultError::validation_field("Hostname cannot be empty", "hostname"));
        }

        let alias = self.create_alias(hostname, mode).await?;
        let password = self.generate_password(password_length).await?;
        let username = match self.generate_username(hostname, display_name).await? {
            Some(username) => username,
            None => alias.clone(),
        };

        let identity = self
            .transport
            .post(
                "/identity",
                &json!({
                    "domain": hostname,
                    "name": display_name,
                    "pii": { "email": alias },
                    "site_type": "generic",
                    "trust_level": 0,
                }),
            )
            .await?;
        let item_id = self.identity_item_id(hostname, identity).await?;
        tracing::Span::current().record("item_id", field::display(&item_id));

        let secret = self
            .transport
            .post(
                "/secret",
                &json!({
                    "item_id": item_id.as_str(),
                    "secret_type": "password",
                    "username": username,
                    "password": password.expose_secret(),
                }),
            )
            .await?;
        let secret_id = pick_identifier_preferring(&secret, &["secret_id"]);

        info!(secret_id = ?secret_id.as_ref().map(Identifier::as_str), "Credential provisioned");
        Ok(ProvisionedCredential { alias, username, password, item_id, secret_id })
    }
}
