//! Response normalization.
//!
//! The vault answers with whatever shape its deployment produces: keyed objects
//! with snake_case or camelCase keys, positional rows, or a bare scalar. This
//! module is the only place that sniffs shapes. It turns raw JSON into
//! [`VaultItem`] / [`VaultSecret`] records once, so the matcher and resolver
//! never look at raw responses.
//!
//! Lookups never fail loudly: "not found" is always `None`.

use serde_json::{Map, Value};

use super::types::{Identifier, SecretType, VaultItem, VaultSecret};

/// Conventional identifier keys tried when no candidate key matches.
pub const ID_FALLBACK_KEYS: &[&str] = &["id", "item_id", "secret_id"];

/// Keys that may carry an identifier in a creation response.
pub const IDENTIFIER_KEYS: &[&str] = &["item_id", "secret_id", "id"];

/// Keys that may carry a username in an identity or item detail response.
pub const USERNAME_KEYS: &[&str] = &["email", "username", "login", "name"];

/// Keys under which listing endpoints wrap their rows.
const LIST_WRAPPER_KEYS: &[&str] = &["items", "secrets", "data", "results"];

/// One logical field: where to find it in a keyed object and in a positional row.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub keys: &'static [&'static str],
    pub position: usize,
}

impl FieldSpec {
    /// Extract this field from a record of any shape.
    ///
    /// A bare scalar record is only ever an identifier, so it answers for the
    /// field at position 0 and nothing else.
    pub fn extract<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        match record {
            Value::Array(row) => row.get(self.position).filter(|v| !v.is_null()),
            Value::Object(map) => lookup_any(map, self.keys),
            Value::String(_) | Value::Number(_) if self.position == 0 => Some(record),
            _ => None,
        }
    }
}

/// Item rows: `[item_id, domain, title]`.
pub mod item_fields {
    use super::FieldSpec;

    pub const ITEM_ID: FieldSpec = FieldSpec { name: "item_id", keys: &["item_id", "id"], position: 0 };
    pub const DOMAIN: FieldSpec = FieldSpec {
        name: "domain",
        keys: &["domain", "hostname", "host", "url", "site"],
        position: 1,
    };
    pub const TITLE: FieldSpec =
        FieldSpec { name: "title", keys: &["title", "name", "label"], position: 2 };
}

/// Secret rows: `[secret_id, item_id, secret_type, username, password]`.
pub mod secret_fields {
    use super::FieldSpec;

    pub const SECRET_ID: FieldSpec =
        FieldSpec { name: "secret_id", keys: &["secret_id", "id"], position: 0 };
    pub const ITEM_ID: FieldSpec = FieldSpec { name: "item_id", keys: &["item_id"], position: 1 };
    pub const SECRET_TYPE: FieldSpec =
        FieldSpec { name: "secret_type", keys: &["secret_type", "type", "kind"], position: 2 };
    pub const USERNAME: FieldSpec = FieldSpec {
        name: "username",
        keys: &["username", "user", "login", "email"],
        position: 3,
    };
    pub const PASSWORD: FieldSpec =
        FieldSpec { name: "password", keys: &["password", "pass", "secret"], position: 4 };
}

/// An item listing row after normalization.
///
/// `text_fields` keeps every string value of the original record so the
/// any-field fallback pass can run without seeing the raw shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub item: VaultItem,
    pub text_fields: Vec<String>,
}

/// Extract a named field from a record of any shape.
///
/// - a scalar string (or number) is returned as-is;
/// - a sequence yields its first element (identifier at position 0);
/// - a mapping is probed with each candidate key verbatim, then snake_case,
///   then camelCase, then the conventional identifier keys.
pub fn extract_field<'a>(record: &'a Value, candidate_keys: &[&str]) -> Option<&'a Value> {
    match record {
        Value::String(_) | Value::Number(_) => Some(record),
        Value::Array(row) => row.first().filter(|v| !v.is_null()),
        Value::Object(map) => {
            lookup_any(map, candidate_keys).or_else(|| lookup_any(map, ID_FALLBACK_KEYS))
        }
        _ => None,
    }
}

/// Extract an identifier from a response whose shape varies by deployment.
pub fn pick_identifier(response: &Value) -> Option<Identifier> {
    let found = extract_field(response, IDENTIFIER_KEYS)?;
    match found {
        Value::Object(_) | Value::Array(_) => pick_identifier(found),
        other => value_text(other).map(Identifier::new),
    }
}

/// Extract an identifier, trying `preferred` keys before the generic ones.
///
/// A creation response may echo the parent's id next to the new record's id,
/// e.g. `{"item_id": "7", "secret_id": "9"}` from `/secret`.
pub fn pick_identifier_preferring(response: &Value, preferred: &[&str]) -> Option<Identifier> {
    if let Value::Object(map) = response {
        if let Some(id) = lookup_any(map, preferred).and_then(value_text) {
            return Some(Identifier::new(id));
        }
    }
    pick_identifier(response)
}

/// Extract a text value, descending into nested objects under the same keys.
///
/// Used for generator responses such as `{"alias": {"email": "..."}}`.
pub fn pick_string(response: &Value, keys: &[&str]) -> Option<String> {
    match response {
        Value::String(s) => non_empty(s),
        Value::Object(map) => keys.iter().find_map(|key| {
            key_variants(key).into_iter().find_map(|variant| match map.get(&variant) {
                Some(Value::String(s)) => non_empty(s),
                Some(nested @ Value::Object(_)) => pick_string(nested, keys),
                _ => None,
            })
        }),
        _ => None,
    }
}

/// Look for a username-like value in an identity or item detail response.
///
/// Objects are probed for [`USERNAME_KEYS`]; sequences yield their first string
/// element that looks like an email address.
pub fn pick_username(response: &Value) -> Option<String> {
    match response {
        Value::Array(values) => values
            .iter()
            .filter_map(Value::as_str)
            .find(|s| s.contains('@'))
            .map(str::to_string),
        Value::Object(map) => USERNAME_KEYS
            .iter()
            .find_map(|key| lookup(map, key).and_then(Value::as_str).and_then(non_empty)),
        _ => None,
    }
}

/// Rows of a listing response, whether bare or wrapped in `{"items": [...]}`.
pub fn list_rows(response: &Value) -> Option<&Vec<Value>> {
    match response {
        Value::Array(rows) => Some(rows),
        Value::Object(map) => {
            LIST_WRAPPER_KEYS.iter().find_map(|key| map.get(*key).and_then(Value::as_array))
        }
        _ => None,
    }
}

/// Normalize one item record. Rows without an identifier are dropped.
pub fn normalize_item(record: &Value) -> Option<VaultItem> {
    let item_id = item_fields::ITEM_ID
        .extract(record)
        .and_then(value_text)
        .or_else(|| match record {
            Value::Object(_) => pick_identifier(record).map(|id| id.as_str().to_string()),
            _ => None,
        })?;

    let domain = item_fields::DOMAIN
        .extract(record)
        .and_then(|v| display_text(v, &["email", "domain", "name"]))
        .unwrap_or_default();
    let title = item_fields::TITLE
        .extract(record)
        .and_then(|v| display_text(v, &["name", "email", "domain"]))
        .unwrap_or_default();

    Some(VaultItem { item_id: Identifier::new(item_id), domain, title })
}

/// Normalize an item listing response into records the matcher can consume.
pub fn normalize_items(response: &Value) -> Vec<ItemRecord> {
    let Some(rows) = list_rows(response) else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let item = normalize_item(row)?;
            Some(ItemRecord { item, text_fields: collect_text(row) })
        })
        .collect()
}

/// Normalize one secret record. Scalars are not secrets.
pub fn normalize_secret(record: &Value) -> Option<VaultSecret> {
    if !matches!(record, Value::Object(_) | Value::Array(_)) {
        return None;
    }

    let text = |spec: &FieldSpec| spec.extract(record).and_then(value_text);

    let secret_type = match text(&secret_fields::SECRET_TYPE) {
        Some(raw) => SecretType::parse(&raw),
        None => SecretType::Other("unknown".to_string()),
    };

    Some(VaultSecret {
        secret_id: text(&secret_fields::SECRET_ID).map(Identifier::new),
        item_id: text(&secret_fields::ITEM_ID).map(Identifier::new),
        secret_type,
        username: text(&secret_fields::USERNAME),
        password: text(&secret_fields::PASSWORD).map(Into::into),
    })
}

/// Normalize a secret listing response.
pub fn normalize_secrets(rows: &[Value]) -> Vec<VaultSecret> {
    rows.iter().filter_map(normalize_secret).collect()
}

/// Text form of a scalar: strings verbatim (if not blank), numbers as decimal text.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Text form of a field that may itself be an alias-like object.
fn display_text(value: &Value, object_keys: &[&str]) -> Option<String> {
    match value {
        Value::Object(map) => object_keys
            .iter()
            .find_map(|key| map.get(*key).and_then(value_text))
            .or_else(|| map.get("id").and_then(value_text)),
        other => value_text(other),
    }
}

/// Every string value in a record, one level deep into nested objects/arrays.
fn collect_text(record: &Value) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>, depth: usize) {
        match value {
            Value::String(s) => out.push(s.clone()),
            Value::Array(values) if depth < 2 => {
                values.iter().for_each(|v| walk(v, out, depth + 1));
            }
            Value::Object(map) if depth < 2 => {
                map.values().for_each(|v| walk(v, out, depth + 1));
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(record, &mut out, 0);
    out
}

fn lookup_any<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| lookup(map, key))
}

/// One key, tried verbatim, then snake_case, then camelCase. `null` is absent.
fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    key_variants(key).into_iter().find_map(|variant| map.get(&variant).filter(|v| !v.is_null()))
}

fn key_variants(key: &str) -> Vec<String> {
    let mut variants = vec![key.to_string()];
    for variant in [to_snake_case(key), to_camel_case(key)] {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

/// `itemId` / `ItemID` / `item-id` -> `item_id`
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower_or_digit = false;

    for ch in key.chars() {
        if ch == '-' || ch == ' ' || ch == '_' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower_or_digit = false;
        } else if ch.is_uppercase() {
            if prev_lower_or_digit && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    out
}

/// `item_id` / `item-id` -> `itemId`
pub fn to_camel_case(key: &str) -> String {
    let snake = to_snake_case(key);
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;

    for ch in snake.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    out
}

/// Blank strings are absent. Anything else is returned verbatim: passwords and
/// identifiers may carry meaningful whitespace.
fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
