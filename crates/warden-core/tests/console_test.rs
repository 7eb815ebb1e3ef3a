#![allow(clippy::unwrap_used)]
// Integration tests for `Console`, `Session` and the list/form flows,
// against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use warden_api::{ApiClient, MemoryTokenStore, TokenStore};
use warden_core::forms::{critical_rule_create_form, critical_rule_create_payload};
use warden_core::{
    Command, CommandResult, Console, ConsoleConfig, CoreError, GuardDecision, PaginationModel,
    Paginator, Route, SubmitOutcome, TokenStorage,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn console_with_token(server: &MockServer, token: Option<&str>) -> Console {
    let store = match token {
        Some(t) => Arc::new(MemoryTokenStore::with_token(t)),
        None => Arc::new(MemoryTokenStore::new()),
    };
    let api = ApiClient::with_client(&server.uri(), reqwest::Client::new(), store).unwrap();
    Console::from_client(api)
}

fn rule_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "protocol": "tcp",
        "srcAddress": null,
        "desAddress": "10.1.1.1",
        "srcPort": null,
        "desPort": 23,
        "action": "block",
        "title": title,
        "description": null,
        "startTime": null,
        "endTime": null,
        "createdAt": "2024-01-02T03:04:05",
        "updatedAt": "2024-01-02T03:04:05"
    })
}

fn user_json(id: i64, username: &str, active: bool) -> serde_json::Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "firstName": "Grace",
        "lastName": "Hopper",
        "active": active,
        "createdAt": "2024-01-02T03:04:05",
        "updatedAt": "2024-01-02T03:04:05"
    })
}

// ── Auth guard & session ────────────────────────────────────────────

#[tokio::test]
async fn test_guard_redirects_without_token_and_never_calls_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "ada", true)))
        .expect(0)
        .mount(&server)
        .await;

    let console = console_with_token(&server, None);
    for route in [Route::Home, Route::Dashboard, Route::Users, Route::CriticalRules] {
        assert_eq!(
            console.guard(route).await,
            GuardDecision::Redirect(Route::Login)
        );
    }
    assert!(!console.auth_state().is_authenticated);
}

#[tokio::test]
async fn test_guard_redirects_when_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("stale"));
    assert_eq!(
        console.guard(Route::FirewallRules).await,
        GuardDecision::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn test_guard_renders_with_valid_session_and_checks_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "ada", true)))
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("good"));
    assert_eq!(
        console.guard(Route::Users).await,
        GuardDecision::Render(Route::Users)
    );
    assert_eq!(
        console.guard(Route::Dashboard).await,
        GuardDecision::Render(Route::Dashboard)
    );
    let state = console.auth_state();
    assert!(state.is_authenticated);
    assert_eq!(state.user.unwrap().username, "ada");
}

#[tokio::test]
async fn test_login_stores_cookie_and_logout_removes_it() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cookie = dir.path().join("cookies.txt");

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "ada", true)))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConsoleConfig::new(
        server.uri().parse().unwrap(),
        TokenStorage::CookieFile(cookie.clone()),
    );
    let console = Console::new(&config).unwrap();
    let mut auth = console.subscribe();

    let user = console
        .login("ada", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    assert_eq!(user.username, "ada");
    assert!(auth.has_changed().unwrap());
    assert!(auth.borrow_and_update().is_authenticated);
    assert!(std::fs::read_to_string(&cookie).unwrap().contains("access_token=fresh"));

    console.logout().await.unwrap();
    assert!(!cookie.exists());
    assert!(!console.auth_state().is_authenticated);
}

#[tokio::test]
async fn test_login_failure_keeps_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Incorrect username or password"})),
        )
        .mount(&server)
        .await;

    let console = console_with_token(&server, None);
    let err = console
        .login("ada", &SecretString::from("nope".to_owned()))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::LoginFailed { .. }));

    let state = console.auth_state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some("Incorrect username or password"));
}

#[tokio::test]
async fn test_unauthorized_list_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "ada", true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    console.initialize().await.unwrap();
    assert!(console.auth_state().is_authenticated);

    let err = console
        .list_critical_rules(PaginationModel::default())
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert!(!console.auth_state().is_authenticated);
}

#[tokio::test]
async fn test_oneshot_fails_before_running_without_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ConsoleConfig::new(
        server.uri().parse().unwrap(),
        TokenStorage::CookieFile(dir.path().join("missing.txt")),
    );

    let result = Console::oneshot(&config, |_| async { Ok::<_, CoreError>("ran") }).await;
    assert!(result.unwrap_err().is_auth());
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Forms ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_submits_once_then_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/critical-rules"))
        .and(body_json(json!({
            "protocol": "tcp",
            "srcAddress": null,
            "desAddress": "10.1.1.1",
            "srcPort": null,
            "desPort": 23,
            "natSrcPort": null,
            "natDesPort": null,
            "action": "block",
            "title": "Block telnet",
            "description": null,
            "startTime": null,
            "endTime": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rule_json(9, "Block telnet")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [rule_json(9, "Block telnet")], "total": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let mut paginator = Paginator::default();
    let mut form = critical_rule_create_form();
    form.set_value("title", "Block telnet");
    form.set_value("action", "block");
    form.set_value("protocol", "tcp");
    form.set_value("desAddress", "10.1.1.1");
    form.set_value("desPort", "23");

    let outcome = form
        .submit(|values| {
            let console = console.clone();
            async move {
                let payload = critical_rule_create_payload(&values)?;
                console.execute(Command::CreateCriticalRule(payload)).await
            }
        })
        .await;
    assert!(outcome.is_submitted());

    paginator
        .load(|model| {
            let console = console.clone();
            async move { console.list_critical_rules(model).await }
        })
        .await;
    assert_eq!(paginator.total(), 1);
    assert_eq!(paginator.rows()[0].title, "Block telnet");

    let requests = server.received_requests().await.unwrap();
    let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, vec!["POST", "GET"]);
}

#[tokio::test]
async fn test_empty_required_field_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rule_json(1, "x")))
        .expect(0)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let mut form = critical_rule_create_form();
    form.set_value("protocol", "udp");

    let outcome = form
        .submit(|values| {
            let console = console.clone();
            async move {
                let payload = critical_rule_create_payload(&values)?;
                console.execute(Command::CreateCriticalRule(payload)).await
            }
        })
        .await;
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(form.visible_error("title"), Some("Title is required"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_submit_lands_in_submit_slot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/critical-rules"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Rule title already used"})),
        )
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let mut form = critical_rule_create_form();
    form.set_value("title", "dup");

    let outcome = form
        .submit(|values| {
            let console = console.clone();
            async move {
                let payload = critical_rule_create_payload(&values)?;
                console.execute(Command::CreateCriticalRule(payload)).await
            }
        })
        .await;
    assert_eq!(outcome, SubmitOutcome::Failed("Rule title already used".into()));
    assert_eq!(form.submit_error(), Some("Rule title already used"));
}

// ── Deletes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_overlapping_bulk_delete_only_sends_unclaimed_ids() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/critical-rules/"))
        .and(body_json(json!([1, 2, 3])))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/critical-rules/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let first = tokio::spawn({
        let console = console.clone();
        async move {
            console
                .execute(Command::DeleteCriticalRules { ids: vec![1, 2, 3] })
                .await
        }
    });

    while server.received_requests().await.unwrap().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // An exact duplicate sends nothing.
    let duplicate = console
        .execute(Command::DeleteCriticalRules { ids: vec![3, 2, 1] })
        .await
        .unwrap();
    assert_eq!(duplicate, CommandResult::Deleted { ids: vec![] });

    let overlapping = console
        .execute(Command::DeleteCriticalRules { ids: vec![2, 3, 4] })
        .await
        .unwrap();
    assert_eq!(overlapping, CommandResult::Deleted { ids: vec![4] });

    let first = first.await.unwrap().unwrap();
    assert_eq!(first, CommandResult::Deleted { ids: vec![1, 2, 3] });
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_ids_are_released_after_delete_settles() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/critical-rules/5"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Rule not found"})))
        .expect(2)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    for _ in 0..2 {
        let err = console
            .execute(Command::DeleteCriticalRule { id: 5 })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}

#[tokio::test]
async fn test_deleted_rule_is_gone_from_next_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [rule_json(1, "a"), rule_json(2, "b")],
            "total": 2
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/critical-rules/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [rule_json(1, "a")], "total": 1})),
        )
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let mut paginator = Paginator::default();
    let fetch = |model| {
        let console = console.clone();
        async move { console.list_critical_rules(model).await }
    };
    paginator.load(fetch).await;
    assert_eq!(paginator.rows().len(), 2);

    console
        .execute(Command::DeleteCriticalRule { id: 2 })
        .await
        .unwrap();
    paginator.load(fetch).await;
    let ids: Vec<i64> = paginator.rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(paginator.total(), 1);
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_flips_only_that_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json(1, "ada", true),
            user_json(2, "grace", true),
            user_json(3, "linus", false)
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/2/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(2, "grace", false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json(1, "ada", true),
            user_json(2, "grace", false),
            user_json(3, "linus", false)
        ])))
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let mut paginator = Paginator::default();
    let fetch = |model| {
        let console = console.clone();
        async move { console.list_users(model).await }
    };
    paginator.load(fetch).await;
    let before: Vec<bool> = paginator.rows().iter().map(|u| u.active).collect();

    let result = console.execute(Command::ToggleUser { id: 2 }).await.unwrap();
    let CommandResult::User(toggled) = result else {
        panic!("expected user");
    };
    assert!(!toggled.active);

    paginator.load(fetch).await;
    let after: Vec<bool> = paginator.rows().iter().map(|u| u.active).collect();
    assert_eq!(before, vec![true, true, false]);
    assert_eq!(after, vec![true, false, false]);
}

#[tokio::test]
async fn test_users_page_translates_to_skip_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("skip", "50"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [user_json(51, "u51", true)],
            "total": 51
        })))
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let page = console
        .list_users(PaginationModel {
            page: 2,
            page_size: 25,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 51);
}

#[tokio::test]
async fn test_update_without_changes_is_refused_locally() {
    let server = MockServer::start().await;
    let console = console_with_token(&server, Some("tok"));
    let err = console
        .execute(Command::UpdateUser {
            id: 1,
            update: warden_core::UserUpdate::default(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.display_message(), "No updates provided");
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_page_two_of_25_fetches_exact_params_and_uses_total() {
    let server = MockServer::start().await;
    let rows: Vec<serde_json::Value> = (51..=75).map(|id| rule_json(id, "r")).collect();
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "25"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": rows, "total": 312})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let mut paginator = Paginator::default();
    let request = paginator.set_page(2);
    paginator
        .run(request, |model| {
            let console = console.clone();
            async move { console.list_critical_rules(model).await }
        })
        .await;

    assert_eq!(paginator.rows().len(), 25);
    assert_eq!(paginator.rows()[0].id, 51);
    assert_eq!(paginator.total(), 312);
    assert_eq!(paginator.range_label(), "51-75 of 312");

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap().to_owned();
    assert_eq!(query, "page=2&pageSize=25");
}

#[tokio::test]
async fn test_failed_refresh_keeps_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/firewall-rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 1, "protocol": "udp", "srcAddress": null, "desAddress": null,
                "srcPort": null, "desPort": 53, "action": "allow",
                "createdAt": "2024-01-02T03:04:05", "updatedAt": "2024-01-02T03:04:05"
            }],
            "total": 1
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/firewall-rules"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "database offline"})))
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let mut paginator = Paginator::default().with_page_sizes(&[25, 50, 100]);
    let fetch = |model| {
        let console = console.clone();
        async move { console.list_firewall_rules(model).await }
    };
    paginator.load(fetch).await;
    paginator.load(fetch).await;

    assert_eq!(paginator.rows().len(), 1);
    assert_eq!(paginator.error(), Some("database offline"));
    assert!(!paginator.is_loading());
}

#[tokio::test]
async fn test_dashboard_combines_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [rule_json(1, "a"), rule_json(2, "b")],
            "total": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/firewall-rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 40})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json(1, "ada", true),
            user_json(2, "bob", false)
        ])))
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let summary = console.dashboard().await.unwrap();
    assert_eq!(summary.critical_rules_total, 2);
    assert_eq!(summary.critical_by_action[&warden_core::Action::Block], 2);
    assert_eq!(summary.firewall_rules_total, 40);
    assert!(summary.partial);
    assert_eq!((summary.active_users, summary.inactive_users), (1, 1));
}

#[test]
fn test_memory_store_is_shared_with_console() {
    let store = Arc::new(MemoryTokenStore::new());
    let api = ApiClient::with_client("http://localhost:8000/api", reqwest::Client::new(), store.clone())
        .unwrap();
    let console = Console::from_client(api);
    store.save(&SecretString::from("t".to_owned())).unwrap();
    assert!(console.api().has_token());
}

// ── Record lookup ───────────────────────────────────────────────────

#[tokio::test]
async fn test_find_critical_rule_walks_pages() {
    let server = MockServer::start().await;
    let first: Vec<_> = (1..=150).map(|id| rule_json(id, "filler")).collect();
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .and(query_param("page", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": first, "total": 151})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/critical-rules"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [rule_json(151, "telnet")],
            "total": 151
        })))
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let rule = console.find_critical_rule(151).await.unwrap();
    assert_eq!(rule.title, "telnet");
}

#[tokio::test]
async fn test_find_user_reports_missing_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json(1, "ada", true)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let console = console_with_token(&server, Some("tok"));
    let err = console.find_user(9).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { ref identifier, .. } if identifier == "9"));
}
