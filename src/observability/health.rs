//! # Health Checking
//!
//! A vault is healthy when its item listing answers. The check runs through the
//! regular transport, so a locked vault with a stored passphrase is unlocked on
//! the way and still reports healthy.

use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::vault::VaultTransport;

/// Status string reported for a reachable vault.
pub const STATUS_OK: &str = "ok";

/// Result of a successful health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub base_url: String,
}

impl HealthReport {
    pub fn ok(base_url: impl Into<String>) -> Self {
        Self { status: STATUS_OK.to_string(), base_url: base_url.into() }
    }
}

/// Check that the vault answers. Failures come back as the underlying error.
pub async fn check_vault(transport: &VaultTransport) -> Result<HealthReport> {
    let start = std::time::Instant::now();
    transport.ping().await?;
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Vault health check passed");
    Ok(HealthReport::ok(transport.base_url()))
}
