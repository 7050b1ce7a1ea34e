//! Credential lifecycle against a mock HR API login endpoint.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use mockito::{Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;

use swapguard::domain::models::{HrApiConfig, TokenConfig};
use swapguard::infrastructure::hr_api::{build_http_client, TokenManager};
use swapguard::HrApiError;

fn jwt_expiring_in(seconds: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({ "sub": "agent", "exp": Utc::now().timestamp() + seconds });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

fn manager_for(server: &ServerGuard) -> TokenManager {
    let api = HrApiConfig {
        base_url: format!("{}/api/v1/", server.url()),
        email: "agent@example.com".to_string(),
        password: "secret".to_string(),
        ..HrApiConfig::default()
    };
    let http = build_http_client(5).expect("http client");
    TokenManager::new(http, &api, &TokenConfig::default())
}

async fn login_returning(server: &mut ServerGuard, body: Value, hits: usize) -> mockito::Mock {
    server
        .mock("POST", "/api/v1/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_login() {
    let mut server = Server::new_async().await;
    let login = login_returning(&mut server, json!({ "access_token": "shared" }), 1).await;
    let manager = Arc::new(manager_for(&server));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.get_valid_token().await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        let token = result.expect("task completes").expect("token acquired");
        assert_eq!(token, "shared");
    }
    login.assert_async().await;
}

#[tokio::test]
async fn test_near_expiry_token_is_refreshed() {
    let mut server = Server::new_async().await;
    let short_lived = jwt_expiring_in(100);
    let renewed = jwt_expiring_in(3600);

    let login = login_returning(
        &mut server,
        json!({ "access_token": short_lived, "refresh_token": "r-1" }),
        1,
    )
    .await;
    let refresh = server
        .mock("POST", "/api/v1/auth/refresh")
        .match_header("authorization", "Bearer r-1")
        .with_status(200)
        .with_body(json!({ "access_token": renewed }).to_string())
        .expect(1)
        .create_async()
        .await;

    let manager = manager_for(&server);

    assert_eq!(manager.get_valid_token().await.unwrap(), short_lived);
    // Inside the 300s safety margin, so the next caller renews.
    assert_eq!(manager.get_valid_token().await.unwrap(), renewed);
    assert_eq!(manager.get_valid_token().await.unwrap(), renewed);

    login.assert_async().await;
    refresh.assert_async().await;

    let status = manager.status().await;
    assert!(status.valid);
    assert!(status.has_refresh_token);
}

#[tokio::test]
async fn test_failed_refresh_falls_back_to_login() {
    let mut server = Server::new_async().await;
    let first = login_returning(
        &mut server,
        json!({ "access_token": jwt_expiring_in(60), "refresh_token": "r-1" }),
        1,
    )
    .await;
    let second = login_returning(&mut server, json!({ "access_token": "fresh" }), 1).await;
    let refresh = server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let manager = manager_for(&server);
    manager.get_valid_token().await.unwrap();

    assert_eq!(manager.get_valid_token().await.unwrap(), "fresh");
    first.assert_async().await;
    refresh.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_failed_login_is_retried_by_next_caller() {
    let mut server = Server::new_async().await;
    let rejected = server
        .mock("POST", "/api/v1/login")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let accepted = login_returning(&mut server, json!({ "token": "second-try" }), 1).await;

    let manager = manager_for(&server);

    let err = manager.get_valid_token().await.expect_err("first login fails");
    assert!(matches!(err, HrApiError::Auth(_)));
    assert!(!manager.status().await.authenticated);

    assert_eq!(manager.get_valid_token().await.unwrap(), "second-try");
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_force_reauthenticate_replaces_credential() {
    let mut server = Server::new_async().await;
    let _first = login_returning(&mut server, json!({ "access_token": "tok-1" }), 1).await;
    let _second = login_returning(&mut server, json!({ "access_token": "tok-2" }), 1).await;

    let manager = manager_for(&server);
    assert_eq!(manager.get_valid_token().await.unwrap(), "tok-1");

    let status = manager.force_reauthenticate().await.expect("re-login");
    assert!(status.authenticated);
    assert!(status.valid);
    assert!(!status.has_refresh_token);

    assert_eq!(manager.get_valid_token().await.unwrap(), "tok-2");
}

#[tokio::test]
async fn test_invalidate_keeps_newer_token() {
    let mut server = Server::new_async().await;
    let login = login_returning(&mut server, json!({ "access_token": "current" }), 1).await;

    let manager = manager_for(&server);
    manager.get_valid_token().await.unwrap();

    manager.invalidate("stale-token").await;

    assert_eq!(manager.get_valid_token().await.unwrap(), "current");
    login.assert_async().await;
}

#[tokio::test]
async fn test_status_before_login() {
    let server = Server::new_async().await;
    let manager = manager_for(&server);

    let status = manager.status().await;
    assert!(!status.authenticated);
    assert!(!status.valid);
    assert!(status.expires_at.is_none());
}
