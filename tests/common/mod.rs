//! Mock vault for integration tests
//!
//! Provides wiremock-based mocks for:
//! - a stateful vault that provisions and then serves credentials
//! - helpers for building transports, resolvers and routers against a mock

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use vaultlink::config::VaultClientConfig;
use vaultlink::unlock::{MemoryUnlockStore, UnlockConfig, UnlockConfigStore};
use vaultlink::vault::{CredentialProvisioner, SecretResolver, VaultTransport};
use vaultlink::VaultRouter;

/// Alias the mock hands out in word mode
pub const MOCK_ALIAS: &str = "quiet.river42@relay.test";

/// Username the mock hands out from the alias generator in username mode
pub const MOCK_USERNAME: &str = "quietriver42";

/// Config pointing at a mock server
pub fn config_for(server: &MockServer) -> VaultClientConfig {
    VaultClientConfig { base_url: server.uri(), timeout_seconds: 5, ..Default::default() }
}

/// Transport with an empty in-memory unlock store
pub fn transport_for(server: &MockServer) -> VaultTransport {
    transport_with_store(server, Arc::new(MemoryUnlockStore::new()))
}

/// Transport whose store already holds a passphrase
pub fn transport_with_passphrase(server: &MockServer, passphrase: &str) -> VaultTransport {
    let store = MemoryUnlockStore::with_config(UnlockConfig::new(passphrase, true));
    transport_with_store(server, Arc::new(store))
}

pub fn transport_with_store(
    server: &MockServer,
    store: Arc<dyn UnlockConfigStore>,
) -> VaultTransport {
    VaultTransport::new(&config_for(server), store).expect("transport")
}

pub fn resolver_for(server: &MockServer) -> SecretResolver {
    SecretResolver::new(transport_for(server))
}

pub fn provisioner_for(server: &MockServer) -> CredentialProvisioner {
    CredentialProvisioner::new(transport_for(server))
}

pub fn router_for(server: &MockServer) -> VaultRouter {
    VaultRouter::new(&config_for(server), Arc::new(MemoryUnlockStore::new())).expect("router")
}

/// Mount a JSON response for one method/path pair
pub async fn mount_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a plain-text response for one method/path pair
pub async fn mount_text(server: &MockServer, verb: &str, route: &str, status: u16, body: &str) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Behaviour switches for [`MockVault`]
#[derive(Debug, Clone, Copy)]
pub struct MockVaultOptions {
    /// `/identity` responds with the new item id
    pub echo_identity_id: bool,
    /// `/alias` honours `mode: "username"`
    pub alias_username_mode: bool,
}

impl Default for MockVaultOptions {
    fn default() -> Self {
        Self { echo_identity_id: true, alias_username_mode: true }
    }
}

/// In-memory state behind the stateful mock
#[derive(Debug, Default)]
pub struct VaultState {
    pub items: Vec<Value>,
    pub secrets: Vec<Value>,
    next_id: u64,
}

impl VaultState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn secrets_for(&self, item_id: &str) -> Vec<Value> {
        self.secrets
            .iter()
            .filter(|s| id_text(&s["item_id"]) == item_id)
            .map(|s| {
                json!({
                    "secret_id": s["secret_id"],
                    "item_id": s["item_id"],
                    "secret_type": s["secret_type"],
                })
            })
            .collect()
    }
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn body_of(req: &Request) -> Value {
    serde_json::from_slice(&req.body).unwrap_or(Value::Null)
}

/// Password of exactly `length` characters
fn generated_password(length: usize) -> String {
    "Xk9#mP2$vL7@qR4!".chars().cycle().take(length).collect()
}

/// A vault that remembers what was provisioned.
///
/// `/username` is not implemented (404), so provisioning always exercises the
/// alias-generator fallback. Secret listings carry metadata only, so retrieval
/// always exercises the detail lookup.
pub struct MockVault {
    pub server: MockServer,
    pub state: Arc<Mutex<VaultState>>,
}

impl MockVault {
    pub async fn start() -> Self {
        Self::start_with(MockVaultOptions::default()).await
    }

    pub async fn start_with(options: MockVaultOptions) -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(VaultState::default()));

        Mock::given(method("POST"))
            .and(path("/alias"))
            .respond_with(move |req: &Request| {
                let body = body_of(req);
                if body["mode"] == "username" {
                    if options.alias_username_mode {
                        ResponseTemplate::new(200).set_body_json(json!({ "username": MOCK_USERNAME }))
                    } else {
                        ResponseTemplate::new(400).set_body_string("unsupported mode")
                    }
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "alias": { "email": MOCK_ALIAS, "mode": body["mode"] } }))
                }
            })
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/password"))
            .respond_with(|req: &Request| {
                let length = body_of(req)["length"].as_u64().unwrap_or(16) as usize;
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "password": generated_password(length) }))
            })
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/username"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let identity_state = Arc::clone(&state);
        Mock::given(method("POST"))
            .and(path("/identity"))
            .respond_with(move |req: &Request| {
                let body = body_of(req);
                let mut state = identity_state.lock().unwrap();
                let id = state.next_id();
                // Newest first, like the real listing.
                state.items.insert(
                    0,
                    json!({ "id": id, "domain": body["domain"], "title": body["name"] }),
                );
                if options.echo_identity_id {
                    ResponseTemplate::new(201).set_body_json(json!({ "item_id": id }))
                } else {
                    ResponseTemplate::new(201).set_body_json(json!({ "status": "created" }))
                }
            })
            .mount(&server)
            .await;

        let secret_state = Arc::clone(&state);
        Mock::given(method("POST"))
            .and(path("/secret"))
            .respond_with(move |req: &Request| {
                let body = body_of(req);
                let mut state = secret_state.lock().unwrap();
                let id = state.next_id();
                state.secrets.push(json!({
                    "secret_id": id,
                    "item_id": body["item_id"],
                    "secret_type": body["secret_type"],
                    "username": body["username"],
                    "password": body["password"],
                }));
                ResponseTemplate::new(201).set_body_json(json!({ "secret_id": id }))
            })
            .mount(&server)
            .await;

        let items_state = Arc::clone(&state);
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(move |_: &Request| {
                let state = items_state.lock().unwrap();
                ResponseTemplate::new(200).set_body_json(Value::Array(state.items.clone()))
            })
            .mount(&server)
            .await;

        let listing_state = Arc::clone(&state);
        Mock::given(method("GET"))
            .and(path_regex(r"^/items/[^/]+/secrets$"))
            .respond_with(move |req: &Request| {
                let item_id = req.url.path().split('/').nth(2).unwrap_or_default().to_string();
                let state = listing_state.lock().unwrap();
                ResponseTemplate::new(200).set_body_json(Value::Array(state.secrets_for(&item_id)))
            })
            .mount(&server)
            .await;

        let detail_state = Arc::clone(&state);
        Mock::given(method("GET"))
            .and(path_regex(r"^/secret/[^/]+$"))
            .respond_with(move |req: &Request| {
                let secret_id = req.url.path().rsplit('/').next().unwrap_or_default().to_string();
                let state = detail_state.lock().unwrap();
                match state.secrets.iter().find(|s| id_text(&s["secret_id"]) == secret_id) {
                    Some(secret) => ResponseTemplate::new(200).set_body_json(secret.clone()),
                    None => ResponseTemplate::new(404).set_body_string("Not Found"),
                }
            })
            .mount(&server)
            .await;

        Self { server, state }
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn secret_count(&self) -> usize {
        self.state.lock().unwrap().secrets.len()
    }
}
