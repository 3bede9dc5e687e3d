//! Normalized record types shared by the matcher, resolver and provisioner.
//!
//! Everything here is shape-independent: the normalizer produces these types
//! from positional rows, keyed objects or bare scalars, and nothing downstream
//! looks at raw vault JSON again.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::VaultError;

/// Opaque identifier assigned by the vault.
///
/// Numbers are carried as their decimal text. An `Identifier` is only ever built
/// from a value observed in a vault response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap a raw identifier observed in a vault response.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A vault item: one site/identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultItem {
    pub item_id: Identifier,
    pub domain: String,
    pub title: String,
}

/// Kind of credential material a secret holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretType {
    Password,
    Totp,
    Note,
    Other(String),
}

impl SecretType {
    /// Parse a vault-supplied type label; unknown labels are preserved.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "password" | "login" => SecretType::Password,
            "totp" => SecretType::Totp,
            "note" | "notes" => SecretType::Note,
            _ => SecretType::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SecretType::Password => "password",
            SecretType::Totp => "totp",
            SecretType::Note => "note",
            SecretType::Other(raw) => raw,
        }
    }
}

/// A secret record linked to an item.
///
/// Listing endpoints often return only `{secret_id, secret_type}`; the detail
/// endpoint fills in the rest, hence the optional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultSecret {
    pub secret_id: Option<Identifier>,
    pub item_id: Option<Identifier>,
    pub secret_type: SecretType,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl VaultSecret {
    /// True when the secret is marked as a password credential.
    pub fn is_password(&self) -> bool {
        self.secret_type == SecretType::Password
    }

    /// Fill fields missing here from a more detailed record of the same secret.
    pub fn merge_detail(mut self, detail: VaultSecret) -> Self {
        if self.secret_id.is_none() {
            self.secret_id = detail.secret_id;
        }
        if self.item_id.is_none() {
            self.item_id = detail.item_id;
        }
        if self.username.is_none() {
            self.username = detail.username;
        }
        if self.password.is_none() {
            self.password = detail.password;
        }
        self
    }
}

/// Transient result of matching a hostname against the item listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub item_id: Identifier,
    pub domain: String,
    pub title: String,
}

impl From<VaultItem> for MatchResult {
    fn from(item: VaultItem) -> Self {
        Self {
            item_id: item.item_id,
            domain: item.domain,
            title: item.title,
        }
    }
}

/// Credential pair resolved for a hostname.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

/// Everything created by one provisioning run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedCredential {
    pub alias: String,
    pub username: String,
    pub password: SecretString,
    pub item_id: Identifier,
    pub secret_id: Option<Identifier>,
}

/// How the vault should generate an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AliasMode {
    /// Word-based alias (`quiet.river42@...`)
    #[default]
    Word,
    /// UUID-style alias
    Uuid,
    /// Username generation through the alias endpoint
    Username,
}

impl AliasMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasMode::Word => "word",
            AliasMode::Uuid => "uuid",
            AliasMode::Username => "username",
        }
    }
}

impl FromStr for AliasMode {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" => Ok(AliasMode::Word),
            "uuid" => Ok(AliasMode::Uuid),
            "username" => Ok(AliasMode::Username),
            other => Err(VaultError::validation_field(
                format!("Unsupported alias mode '{}'. Use 'word', 'uuid' or 'username'.", other),
                "mode",
            )),
        }
    }
}

impl fmt::Display for AliasMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// Passwords and the unlock passphrase travel through the engine in this type.
/// The value is zeroed on drop and can only be read through
/// [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret in characters without exposing it.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
