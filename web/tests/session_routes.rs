//! End-to-end tests for the session routes against a mock backend.

#![allow(clippy::unwrap_used)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use verdant_auth::{mocks::MockAuthBackend, AuthError, LoginType, SessionSigner};
use verdant_testing::test_clock;
use verdant_web::{handlers, AppState};

fn signer() -> SessionSigner {
    SessionSigner::new(b"route-test-secret", chrono::Duration::hours(1))
}

fn app(backend: MockAuthBackend) -> Router {
    handlers::routes().with_state(
        AppState::new(backend, signer()).with_clock(Arc::new(test_clock())),
    )
}

fn login_request(body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/api/session/login")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    request.body(Body::from(body.to_string())).unwrap()
}

fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    request.body(Body::empty()).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_login_sets_cookie_pair_and_returns_dashboard() {
    let backend = MockAuthBackend::new().with_login_body(
        LoginType::Seller,
        json!({"token": "jwt-9", "seller": {"_id": "s9", "email": "shop@example.com"}}),
    );

    let response = app(backend)
        .oneshot(login_request(
            &json!({"email": "shop@example.com", "password": "pw", "loginType": "seller"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 3);
    assert!(cookies[0].starts_with("token=jwt-9;"));
    assert!(cookies[0].contains("HttpOnly"));
    assert!(cookies[1].starts_with("loginType=seller;"));
    assert!(cookies[2].starts_with("session="));

    let body = json_body(response).await;
    assert_eq!(body["redirect"], "/seller/dashboard");
    assert_eq!(body["session"]["role"], "seller");
    assert_eq!(body["session"]["subjectId"], "s9");
    assert_eq!(body["clientRecord"]["authToken"], "jwt-9");
    assert_eq!(body["clientRecord"]["userData"]["_id"], "s9");
}

#[tokio::test]
async fn test_login_rejection_sets_no_cookies() {
    let backend = MockAuthBackend::new().with_login_error(
        LoginType::User,
        AuthError::Authentication {
            message: "Invalid credentials".into(),
        },
    );

    let response = app(backend)
        .oneshot(login_request(
            &json!({"email": "fern@example.com", "password": "nope", "loginType": "user"}),
            Some("token=prior; loginType=seller"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let body = json_body(response).await;
    assert_eq!(body["message"], "Invalid credentials");
    assert_eq!(body["code"], "AUTHENTICATION_FAILED");
}

#[tokio::test]
async fn test_login_validation_never_calls_backend() {
    let backend = MockAuthBackend::new();

    let response = app(backend.clone())
        .oneshot(login_request(&json!({"email": "fern@example.com"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(backend.login_calls(), 0);
    assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_rejects_non_json_body() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/session/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("email=fern"))
        .unwrap();

    let response = app(MockAuthBackend::new()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_backend_down_is_unavailable() {
    let backend = MockAuthBackend::new()
        .with_login_error(LoginType::User, AuthError::Network("refused".into()));

    let response = app(backend)
        .oneshot(login_request(
            &json!({"email": "fern@example.com", "password": "pw", "loginType": "user"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_logout_always_clears_and_redirects_home() {
    let backend =
        MockAuthBackend::new().with_logout_error(AuthError::Network("backend down".into()));

    let response = app(backend.clone())
        .oneshot(request(
            Method::POST,
            "/api/session/logout",
            Some("token=abc; loginType=user"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    assert_eq!(backend.logout_calls(), 1);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 3);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_logout_without_session_is_harmless() {
    let backend = MockAuthBackend::new();

    let response = app(backend.clone())
        .oneshot(request(Method::POST, "/api/session/logout", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(backend.logout_calls(), 0);
    assert_eq!(set_cookies(&response).len(), 3);
}

#[tokio::test]
async fn test_current_session_verifies_and_refreshes() {
    let backend = MockAuthBackend::new().with_verify_body(json!({
        "success": true,
        "user": {"_id": "u1", "email": "fern@example.com", "role": "user"}
    }));

    let response = app(backend.clone())
        .oneshot(request(
            Method::GET,
            "/api/session",
            Some("token=abc; loginType=user"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.verify_calls(), 1);
    assert_eq!(set_cookies(&response).len(), 3);

    let body = json_body(response).await;
    assert_eq!(body["session"]["email"], "fern@example.com");
    assert_eq!(body["clientRecord"]["authToken"], "abc");
}

#[tokio::test]
async fn test_current_session_refused_clears_cookies() {
    let backend = MockAuthBackend::new()
        .with_verify_error(AuthError::VerificationFailed("revoked".into()));

    let response = app(backend)
        .oneshot(request(
            Method::GET,
            "/api/session",
            Some("token=abc; loginType=seller"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("token=;")));
    assert_eq!(json_body(response).await["code"], "SESSION_INVALID");
}

#[tokio::test]
async fn test_current_session_without_cookies() {
    let backend = MockAuthBackend::new();

    let response = app(backend.clone())
        .oneshot(request(Method::GET, "/api/session", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.verify_calls(), 0);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_current_session_with_unknown_role_is_cleared() {
    let backend = MockAuthBackend::new();

    let response = app(backend.clone())
        .oneshot(request(
            Method::GET,
            "/api/session",
            Some("token=abc; loginType=superuser"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.verify_calls(), 0);
    assert_eq!(set_cookies(&response).len(), 3);
}
