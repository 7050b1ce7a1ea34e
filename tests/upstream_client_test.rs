//! Integration tests for the resilient HR API client
//!
//! Test coverage:
//! - Envelope unwrapping and bearer token reuse
//! - One re-login after a first-attempt 401
//! - Retry of 5xx responses, no retry of other 4xx responses
//! - Open circuit short-circuits without touching the network
//! - Token taken from the auth cookie
//! - Query parameters are form-encoded

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

use swapguard::domain::models::{HrApiConfig, TokenConfig};
use swapguard::infrastructure::hr_api::{
    build_http_client, HttpHrDirectory, RetryPolicy, TokenManager, UpstreamClient,
};
use swapguard::services::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use swapguard::{HrApiError, HrDirectory};

fn api_config(server: &ServerGuard) -> HrApiConfig {
    HrApiConfig {
        base_url: format!("{}/api/v1/", server.url()),
        email: "agent@example.com".to_string(),
        password: "secret".to_string(),
        ..HrApiConfig::default()
    }
}

fn client_with(server: &ServerGuard, retry: RetryPolicy, breaker_threshold: u32) -> UpstreamClient {
    let config = api_config(server);
    let http = build_http_client(5).expect("http client");
    let tokens = Arc::new(TokenManager::new(http.clone(), &config, &TokenConfig::default()));
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: breaker_threshold,
        open_timeout: chrono::Duration::seconds(60),
        enabled: true,
    }));
    UpstreamClient::new(http, config.base_url, "data", tokens, breaker, retry)
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, 1, 5)
}

async fn login_mock(server: &mut ServerGuard, token: &str, hits: usize) -> mockito::Mock {
    server
        .mock("POST", "/api/v1/login")
        .match_body(Matcher::PartialJson(json!({ "email": "agent@example.com" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "access_token": token }).to_string())
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_envelope_is_unwrapped_and_token_reused() {
    let mut server = Server::new_async().await;
    let login = login_mock(&mut server, "tok-1", 1).await;
    let employee = server
        .mock("GET", "/api/v1/employees/7")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_body(json!({ "data": { "id": 7, "full_name": "Ana" } }).to_string())
        .expect(2)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(0), 5);

    let first = client.get("employees/7").await.expect("first call");
    let second = client.get("employees/7").await.expect("second call");

    assert_eq!(first, json!({ "id": 7, "full_name": "Ana" }));
    assert_eq!(first, second);
    login.assert_async().await;
    employee.assert_async().await;
}

#[tokio::test]
async fn test_unenveloped_body_is_returned_as_is() {
    let mut server = Server::new_async().await;
    let _login = login_mock(&mut server, "tok-1", 1).await;
    let _assignments = server
        .mock("GET", "/api/v1/shifts/3/assignments")
        .with_status(200)
        .with_body(json!([{ "employee_id": 1 }, { "employee_id": 2 }]).to_string())
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(0), 5);
    let body = client.get("shifts/3/assignments").await.expect("call succeeds");

    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_401_triggers_one_relogin() {
    let mut server = Server::new_async().await;
    let first_login = login_mock(&mut server, "tok-1", 1).await;
    let second_login = login_mock(&mut server, "tok-2", 1).await;
    let rejected = server
        .mock("GET", "/api/v1/shifts/5")
        .match_header("authorization", "Bearer tok-1")
        .with_status(401)
        .with_body("token expired")
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/api/v1/shifts/5")
        .match_header("authorization", "Bearer tok-2")
        .with_status(200)
        .with_body(json!({ "data": { "id": 5, "shift_type": "night" } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(2), 5);
    let body = client.get("shifts/5").await.expect("succeeds after re-login");

    assert_eq!(body["shift_type"], "night");
    first_login.assert_async().await;
    second_login.assert_async().await;
    rejected.assert_async().await;
    accepted.assert_async().await;
    assert_eq!(client.breaker().snapshot().failure_count, 0);
}

#[tokio::test]
async fn test_second_401_is_returned() {
    let mut server = Server::new_async().await;
    let login = login_mock(&mut server, "tok", 2).await;
    let _rejected = server
        .mock("GET", "/api/v1/shifts/5")
        .with_status(401)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(2), 5);
    let err = client.get("shifts/5").await.expect_err("still unauthorized");

    assert!(err.is_unauthorized());
    login.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mut server = Server::new_async().await;
    let _login = login_mock(&mut server, "tok-1", 1).await;
    let failing = server
        .mock("GET", "/api/v1/fatigue-scores/1")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;
    let recovered = server
        .mock("GET", "/api/v1/fatigue-scores/1")
        .with_status(200)
        .with_body(json!({ "data": { "total_score": 42 } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(2), 5);
    let body = client.get("fatigue-scores/1").await.expect("third attempt succeeds");

    assert_eq!(body["total_score"], 42);
    failing.assert_async().await;
    recovered.assert_async().await;
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mut server = Server::new_async().await;
    let _login = login_mock(&mut server, "tok-1", 1).await;
    let failing = server
        .mock("GET", "/api/v1/fatigue-scores/1")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(2), 5);
    let err = client.get("fatigue-scores/1").await.expect_err("gives up");

    assert!(err.is_transient());
    failing.assert_async().await;
    // One logical call, one breaker failure.
    assert_eq!(client.breaker().snapshot().failure_count, 1);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mut server = Server::new_async().await;
    let _login = login_mock(&mut server, "tok-1", 1).await;
    let missing = server
        .mock("GET", "/api/v1/employees/404")
        .with_status(404)
        .with_body("no such employee")
        .expect(1)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(2), 5);
    let err = client.get("employees/404").await.expect_err("404");

    match err {
        HrApiError::Http { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "no such employee");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    missing.assert_async().await;
}

#[tokio::test]
async fn test_open_breaker_makes_no_request() {
    let mut server = Server::new_async().await;
    let _login = login_mock(&mut server, "tok-1", 1).await;
    let failing = server
        .mock("GET", "/api/v1/employees/1")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(0), 2);

    assert!(client.get("employees/1").await.is_err());
    assert!(client.get("employees/1").await.is_err());
    assert_eq!(client.breaker().state(), CircuitState::Open);

    let err = client.get("employees/1").await.expect_err("breaker open");
    assert!(err.is_circuit_open());
    failing.assert_async().await;
}

#[tokio::test]
async fn test_token_from_auth_cookie() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/v1/login")
        .with_status(200)
        .with_header("set-cookie", "auth_token=cookie-tok; Path=/; HttpOnly")
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let employee = server
        .mock("GET", "/api/v1/employees/2")
        .match_header("authorization", "Bearer cookie-tok")
        .with_status(200)
        .with_body(json!({ "id": 2 }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(0), 5);
    client.get("employees/2").await.expect("cookie token accepted");

    login.assert_async().await;
    employee.assert_async().await;
}

#[tokio::test]
async fn test_login_failure_is_auth_error_and_not_retried() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/v1/login")
        .with_status(401)
        .with_body("invalid credentials for agent@example.com / secret")
        .expect(1)
        .create_async()
        .await;

    let client = client_with(&server, fast_retry(2), 5);
    let err = client.get("employees/2").await.expect_err("login fails");

    match err {
        HrApiError::Auth(message) => {
            assert!(!message.contains("secret"));
            assert!(message.contains("[REDACTED]"));
        }
        other => panic!("expected auth error, got {other:?}"),
    }
    login.assert_async().await;
}

#[tokio::test]
async fn test_availability_date_with_offset_is_encoded() {
    let mut server = Server::new_async().await;
    let _login = login_mock(&mut server, "tok-1", 1).await;
    let availability = server
        .mock(
            "GET",
            Matcher::Regex(r"^/api/v1/employees/3/availability".to_string()),
        )
        .match_query(Matcher::UrlEncoded(
            "date".to_string(),
            "2026-03-02T00:00:00+00:00".to_string(),
        ))
        .with_status(200)
        .with_body(json!({ "data": { "is_available": false, "reason": "vacation" } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let directory = HttpHrDirectory::new(Arc::new(client_with(&server, fast_retry(0), 5)));
    let found = directory
        .get_availability(3, "2026-03-02T00:00:00+00:00")
        .await
        .expect("availability fetched")
        .expect("availability present");

    assert!(!found.is_available);
    assert_eq!(found.reason.as_deref(), Some("vacation"));
    availability.assert_async().await;
}
