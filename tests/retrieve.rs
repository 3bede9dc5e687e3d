//! Secret lookup and hostname retrieval against mock vaults.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{mount_json, mount_text, resolver_for};
use vaultlink::vault::{Identifier, SecretType};
use vaultlink::VaultError;

#[tokio::test]
async fn per_item_404_falls_back_to_global_listing() {
    let server = MockServer::start().await;
    mount_text(&server, "GET", "/items/x/secrets", 404, "Not Found").await;
    mount_json(
        &server,
        "GET",
        "/secrets",
        200,
        json!([
            {"secret_id": "s1", "item_id": "x", "secret_type": "password", "username": "u", "password": "p"},
            {"secret_id": "s2", "item_id": "y", "secret_type": "password"}
        ]),
    )
    .await;

    let secrets = resolver_for(&server).fetch_secrets_for_item(&Identifier::new("x")).await.unwrap();
    assert_eq!(secrets.len(), 1);
    assert_eq!(secrets[0].secret_id.as_ref().unwrap().as_str(), "s1");
    assert_eq!(secrets[0].secret_type, SecretType::Password);
}

#[tokio::test]
async fn empty_per_item_list_is_authoritative() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/items/x/secrets", 200, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/secrets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let secrets = resolver_for(&server).fetch_secrets_for_item(&Identifier::new("x")).await.unwrap();
    assert!(secrets.is_empty());
}

#[tokio::test]
async fn both_listings_missing_is_empty() {
    let server = MockServer::start().await;
    mount_text(&server, "GET", "/items/x/secrets", 404, "Not Found").await;
    mount_text(&server, "GET", "/secrets", 500, "boom").await;

    let secrets = resolver_for(&server).fetch_secrets_for_item(&Identifier::new("x")).await.unwrap();
    assert!(secrets.is_empty());
}

#[tokio::test]
async fn locked_probe_is_not_swallowed() {
    let server = MockServer::start().await;
    mount_text(&server, "GET", "/items/x/secrets", 403, "Vault locked").await;

    let err = resolver_for(&server).fetch_secrets_for_item(&Identifier::new("x")).await.unwrap_err();
    assert!(matches!(err, VaultError::Locked { .. }), "got {err:?}");
}

#[tokio::test]
async fn retrieve_from_positional_rows() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/items",
        200,
        json!([["3", "other.org", "Other"], ["7", "example.com", "Example"]]),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/items/7/secrets",
        200,
        json!([["s9", "7", "totp", null, null], ["s1", "7", "password", "alice", "hunter22"]]),
    )
    .await;

    let credential = resolver_for(&server).retrieve("example.com").await.unwrap();
    assert_eq!(credential.username.as_deref(), Some("alice"));
    assert_eq!(credential.password.unwrap().expose_secret(), "hunter22");
}

#[tokio::test]
async fn retrieve_loads_detail_and_probes_username() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/items", 200, json!({"items": [{"id": 5, "domain": "shop.example.com"}]}))
        .await;
    mount_json(
        &server,
        "GET",
        "/items/5/secrets",
        200,
        json!([{"secretId": 12, "secretType": "password"}]),
    )
    .await;
    mount_json(&server, "GET", "/secret/12", 200, json!({"secret_id": 12, "password": "from-detail"}))
        .await;
    mount_text(&server, "GET", "/identity/5", 404, "Not Found").await;
    mount_json(&server, "GET", "/items/5", 200, json!({"id": 5, "pii": {}, "email": "alias@relay.test"}))
        .await;

    let credential = resolver_for(&server).retrieve("example.com").await.unwrap();
    assert_eq!(credential.username.as_deref(), Some("alias@relay.test"));
    assert_eq!(credential.password.unwrap().expose_secret(), "from-detail");
}

#[tokio::test]
async fn username_from_array_response() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/identity/5", 200, json!(["5", "Alice", "alice@relay.test"])).await;

    let secret = vaultlink::vault::VaultSecret {
        secret_id: None,
        item_id: None,
        secret_type: SecretType::Password,
        username: None,
        password: None,
    };
    let username = resolver_for(&server).resolve_username(&Identifier::new("5"), &secret).await;
    assert_eq!(username.as_deref(), Some("alice@relay.test"));
}

#[tokio::test]
async fn retrieve_error_kinds() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/items",
        200,
        json!([{"item_id": "a", "domain": "empty.example"}, {"item_id": "b", "domain": "bare.example"}]),
    )
    .await;
    mount_json(&server, "GET", "/items/a/secrets", 200, json!([])).await;
    mount_json(&server, "GET", "/items/b/secrets", 200, json!([{"secret_id": "s", "secret_type": "note"}]))
        .await;
    mount_text(&server, "GET", "/secret/s", 404, "Not Found").await;

    let resolver = resolver_for(&server);

    let err = resolver.retrieve("nowhere.test").await.unwrap_err();
    assert!(matches!(err, VaultError::NoMatch { .. }), "got {err:?}");

    let err = resolver.retrieve("empty.example").await.unwrap_err();
    assert!(matches!(err, VaultError::NoSecret { .. }), "got {err:?}");

    let err = resolver.retrieve("bare.example").await.unwrap_err();
    assert!(matches!(err, VaultError::IncompleteCredential { .. }), "got {err:?}");
}

#[tokio::test]
async fn listing_failure_propagates() {
    let server = MockServer::start().await;
    mount_text(&server, "GET", "/items", 500, "database is on fire").await;

    let err = resolver_for(&server).retrieve("example.com").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn stored_text_is_returned_verbatim() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/items", 200, json!([{"item_id": "id-1", "domain": " example.com "}]))
        .await;
    mount_json(
        &server,
        "GET",
        "/items/id-1/secrets",
        200,
        json!([{
            "secret_id": "s1",
            "item_id": "id-1",
            "secret_type": "password",
            "username": " bob ",
            "password": "  pw with spaces  "
        }]),
    )
    .await;

    let credential = resolver_for(&server).retrieve("example.com").await.unwrap();
    assert_eq!(credential.username.as_deref(), Some(" bob "));
    assert_eq!(credential.password.unwrap().expose_secret(), "  pw with spaces  ");
}
