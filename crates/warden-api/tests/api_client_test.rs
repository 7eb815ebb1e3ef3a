#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use warden_api::{
    Action, ApiClient, CriticalRuleCreate, CriticalRuleUpdate, Error, MemoryTokenStore,
    TokenStore, UserUpdate,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_token("tok-123"));
    let client = ApiClient::with_client(&server.uri(), reqwest::Client::new(), tokens).unwrap();
    (server, client)
}

async fn setup_without_token() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let client = ApiClient::with_client(&server.uri(), reqwest::Client::new(), tokens).unwrap();
    (server, client)
}

fn rule_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "protocol": "tcp",
        "srcAddress": "10.0.0.1",
        "desAddress": null,
        "srcPort": 22,
        "desPort": null,
        "natSrcPort": null,
        "natDesPort": null,
        "action": "block",
        "title": title,
        "description": null,
        "startTime": null,
        "endTime": "2024-06-01T00:00:00",
        "createdAt": "2024-01-02T03:04:05.123456",
        "updatedAt": "2024-01-02T03:04:05.123456"
    })
}

fn user_json(id: i64, username: &str, active: bool) -> serde_json::Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@domain.com"),
        "firstName": "Ada",
        "lastName": "Lovelace",
        "active": active,
        "lastLogin": null,
        "loginAttempts": 0,
        "createdAt": "2024-01-02T03:04:05",
        "updatedAt": "2024-01-02T03:04:05"
    })
}

fn has_no_authorization(req: &Request) -> bool {
    !req.headers.contains_key("authorization")
}

// ── Token handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let (server, client) = setup_without_token().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 0})))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.list_critical_rules(0, 25).await;
    assert!(
        matches!(result, Err(Error::MissingToken)),
        "expected MissingToken, got: {result:?}"
    );
    assert_eq!(
        result.unwrap_err().to_string(),
        "No access token found"
    );
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "admin", true)))
        .expect(1)
        .mount(&server)
        .await;

    let me = client.get_me().await.unwrap();
    assert_eq!(me.username, "admin");
    assert_eq!(me.full_name(), "Ada Lovelace");
}

#[tokio::test]
async fn test_unauthorized_maps_detail() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Not Authenticated"})),
        )
        .mount(&server)
        .await;

    let err = client.get_me().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.detail(), Some("Not Authenticated"));
}

// ── Critical rules ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_critical_rules_sends_page_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [rule_json(51, "Block ssh"), rule_json(52, "Block telnet")],
            "total": 312
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.list_critical_rules(2, 25).await.unwrap();
    assert_eq!(page.total, 312);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].id, 51);
    assert_eq!(page.data[0].action, Action::Block);
    assert_eq!(page.data[0].src_port, Some(22));
    assert!(page.data[0].end_time.is_some());
}

#[tokio::test]
async fn test_create_critical_rule_posts_camel_case_body() {
    let (server, client) = setup().await;

    let expected = json!({
        "protocol": "udp",
        "srcAddress": "192.168.1.10",
        "desAddress": null,
        "srcPort": null,
        "desPort": 53,
        "natSrcPort": null,
        "natDesPort": null,
        "action": "drop",
        "title": "Drop dns",
        "description": null,
        "startTime": null,
        "endTime": null
    });

    Mock::given(method("POST"))
        .and(path("/critical-rules"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(rule_json(7, "Drop dns")))
        .expect(1)
        .mount(&server)
        .await;

    let create = CriticalRuleCreate {
        protocol: Some("udp".into()),
        src_address: Some("192.168.1.10".into()),
        des_port: Some(53),
        action: Action::Drop,
        title: "Drop dns".into(),
        ..Default::default()
    };
    let created = client.create_critical_rule(&create).await.unwrap();
    assert_eq!(created.id, 7);
}

#[tokio::test]
async fn test_update_critical_rule_sends_only_changed_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/critical-rules/7"))
        .and(body_json(json!({"title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rule_json(7, "Renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let update = CriticalRuleUpdate {
        title: Some("Renamed".into()),
        ..Default::default()
    };
    let updated = client.update_critical_rule(7, &update).await.unwrap();
    assert_eq!(updated.title, "Renamed");
}

#[tokio::test]
async fn test_bulk_delete_sends_id_list_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/critical-rules/"))
        .and(body_json(json!([3, 5, 8])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_critical_rules(&[3, 5, 8]).await.unwrap();
}

#[tokio::test]
async fn test_delete_not_found_surfaces_detail() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/critical-rules/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "critical rule not found"})),
        )
        .mount(&server)
        .await;

    let err = client.delete_critical_rule(99).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.detail(), Some("critical rule not found"));
}

// ── Firewall rules ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_firewall_rules() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/firewall-rules"))
        .and(query_param("page", "0"))
        .and(query_param("pageSize", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 1,
                "protocol": "tcp",
                "srcAddress": "1.2.3.4",
                "desAddress": "5.6.7.8",
                "srcPort": 1000,
                "desPort": 80,
                "action": "allow",
                "createdAt": "2024-01-02T03:04:05Z",
                "updatedAt": "2024-01-02T03:04:05Z"
            }],
            "total": 1
        })))
        .mount(&server)
        .await;

    let page = client.list_firewall_rules(0, 50).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].des_port, Some(80));
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_posts_form_without_bearer() {
    let (server, client) = setup_without_token().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=admin"))
        .and(body_string_contains("password=s3cret"))
        .and(has_no_authorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client.login("admin", "s3cret").await.unwrap();
    assert_eq!(token.access_token.expose_secret(), "fresh-token");
    assert_eq!(token.token_type, "bearer");
    // Login alone never writes the cookie.
    assert!(client.tokens().load().unwrap().is_none());
}

#[tokio::test]
async fn test_login_rejection_carries_detail() {
    let (server, client) = setup_without_token().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect credentials"})),
        )
        .mount(&server)
        .await;

    let err = client.login("admin", "wrong").await.unwrap_err();
    assert!(
        matches!(&err, Error::LoginRejected { detail } if detail == "Incorrect credentials"),
        "got: {err:?}"
    );
    assert_eq!(err.to_string(), "Incorrect credentials");
}

#[tokio::test]
async fn test_list_users_uses_skip_and_limit() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("skip", "50"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json(51, "alice", true),
            user_json(52, "bob", false)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.list_users(50, 25).await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.total, 2);
    assert!(!page.data[1].active);
}

#[tokio::test]
async fn test_toggle_user_hits_toggle_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/users/4/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(4, "carol", false)))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.toggle_user(4).await.unwrap();
    assert!(!user.active);
}

#[tokio::test]
async fn test_update_user_sends_partial_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/users/4"))
        .and(body_json(json!({"email": "new@domain.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(4, "carol", true)))
        .expect(1)
        .mount(&server)
        .await;

    let update = UserUpdate {
        email: Some("new@domain.com".into()),
        ..Default::default()
    };
    client.update_user(4, &update).await.unwrap();
}

#[tokio::test]
async fn test_delete_active_user_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/users/4"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Cannot delete active user carol"
        })))
        .mount(&server)
        .await;

    let err = client.delete_user(4).await.unwrap_err();
    assert!(
        matches!(&err, Error::Api { status: 400, detail } if detail.contains("active user")),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_validation_error_list_is_flattened() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address"},
                {"loc": ["body", "username"], "msg": "field required"}
            ]
        })))
        .mount(&server)
        .await;

    let create = warden_api::UserCreate {
        username: String::new(),
        email: "nope".into(),
        first_name: "A".into(),
        last_name: "B".into(),
        password: "pw".into(),
        active: true,
    };
    let err = client.create_user(&create).await.unwrap_err();
    assert_eq!(
        err.detail(),
        Some("value is not a valid email address; field required")
    );
}
