//! Integration tests for the HTTP request helper.
//!
//! These tests spin up a real `axum` server on a random port and point
//! the client at it, so headers, status handling and body decoding are
//! verified over an actual socket rather than against mocks.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tradedesk_transport::{ApiClient, Method, TransportError};

// =========================================================================
// Stub backend
// =========================================================================

/// Echoes back the auth and content-type headers plus the JSON body.
async fn echo(headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    Json(json!({
        "authorization": header("authorization"),
        "content_type": header("content-type"),
        "body": serde_json::from_slice::<Value>(&body).ok(),
    }))
}

async fn plain_text_failure() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "Bad Gateway")
}

async fn detail_failure() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": "Email already registered" })),
    )
}

async fn empty_ok() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn login_rejected() -> StatusCode {
    StatusCode::UNAUTHORIZED
}

/// Starts the stub on `127.0.0.1:0` and returns the API root URL.
async fn start_backend() -> String {
    let app = Router::new()
        .route("/api/echo", get(echo).post(echo).patch(echo))
        .route("/api/broken", get(plain_text_failure))
        .route("/api/duplicate", post(detail_failure))
        .route("/api/empty", get(empty_ok))
        .route("/api/auth/login", post(login_rejected));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}/api")
}

// =========================================================================
// request()
// =========================================================================

#[tokio::test]
async fn test_request_with_token_sends_bearer_header() {
    let client = ApiClient::new(&start_backend().await).unwrap();

    let value = client
        .request(Method::Get, "/echo", None, Some("tok-123"))
        .await
        .expect("should succeed");

    assert_eq!(value["authorization"], "Bearer tok-123");
    assert_eq!(value["content_type"], "application/json");
}

#[tokio::test]
async fn test_request_without_token_omits_auth_header() {
    let client = ApiClient::new(&start_backend().await).unwrap();

    let value = client
        .request(Method::Get, "/echo", None, None)
        .await
        .expect("should succeed");

    assert_eq!(value["authorization"], Value::Null);
}

#[tokio::test]
async fn test_request_sends_json_body() {
    let client = ApiClient::new(&start_backend().await).unwrap();
    let body = json!({ "qty": 3, "sku": "BHUJIA-200" });

    let value = client
        .request(Method::Patch, "/echo", Some(&body), Some("t"))
        .await
        .expect("should succeed");

    assert_eq!(value["body"], body);
}

#[tokio::test]
async fn test_request_non_2xx_text_body_uses_status_message() {
    let client = ApiClient::new(&start_backend().await).unwrap();

    let err = client
        .request(Method::Get, "/broken", None, None)
        .await
        .expect_err("502 should fail");

    match err {
        TransportError::Api(api) => {
            assert_eq!(api.status, 502);
            assert_eq!(api.message, "Request failed: 502");
            assert_eq!(api.body, json!("Bad Gateway"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_request_non_2xx_detail_becomes_message() {
    let client = ApiClient::new(&start_backend().await).unwrap();

    let err = client
        .request(Method::Post, "/duplicate", Some(&json!({})), None)
        .await
        .expect_err("400 should fail");

    assert_eq!(err.to_string(), "Email already registered");
}

#[tokio::test]
async fn test_request_empty_body_is_null() {
    let client = ApiClient::new(&start_backend().await).unwrap();

    let value = client
        .request(Method::Get, "/empty", None, None)
        .await
        .expect("204 should succeed");

    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_request_unreachable_host_is_network_error() {
    // Bind then drop a listener to get a port nobody is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}/api")).unwrap();
    let err = client
        .request(Method::Get, "/echo", None, None)
        .await
        .expect_err("nothing is listening");

    assert!(matches!(err, TransportError::Network(_)));
}

// =========================================================================
// login()
// =========================================================================

#[tokio::test]
async fn test_login_failure_without_detail_uses_login_label() {
    let client = ApiClient::new(&start_backend().await).unwrap();

    let err = client
        .login::<Value>("/auth/login", &json!({ "email": "a@b.c", "password": "x" }))
        .await
        .expect_err("401 should fail");

    assert_eq!(err.to_string(), "Login failed: 401");
}

#[tokio::test]
async fn test_request_as_shape_mismatch_is_protocol_error() {
    let client = ApiClient::new(&start_backend().await).unwrap();

    let result: Result<Vec<String>, _> = client
        .request_as(Method::Get, "/echo", None, None)
        .await;

    assert!(matches!(result, Err(TransportError::Protocol(_))));
}
