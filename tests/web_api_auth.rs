//! Web API Auth Tests
//!
//! Session exchange, token handling and profile updates.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use cloudrive::backend::Collection;
use cloudrive::drive::DriveSettings;
use serde_json::{json, Value};

use common::{create_test_app, create_test_app_with, create_test_config, sign_in};

#[tokio::test]
async fn test_session_exchange_creates_user() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;

    assert!(!alice.token.is_empty());
    assert_eq!(app.memory.document_count(Collection::Users).await, 1);

    // Signing in again reuses the user document.
    let again = sign_in(&app, "alice@example.com", "Alice").await;
    assert_eq!(again.id, alice.id);
    assert_eq!(app.memory.document_count(Collection::Users).await, 1);
}

#[tokio::test]
async fn test_session_response_shape() {
    let app = create_test_app().await;
    app.memory
        .register_session(
            "s1",
            cloudrive::backend::Account {
                id: "acc1".to_string(),
                email: "bob@example.com".to_string(),
                name: String::new(),
            },
        )
        .await;

    let response = app
        .server
        .post("/api/auth/session")
        .json(&json!({ "session": "s1" }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 900);
    assert_eq!(body["data"]["user"]["email"], "bob@example.com");
    assert_eq!(body["data"]["user"]["full_name"], "bob");
}

#[tokio::test]
async fn test_invalid_session_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/session")
        .json(&json!({ "session": "unknown" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_empty_session_is_validation_error() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/session")
        .json(&json!({ "session": "" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["session"].is_array());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/session")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["data"]["id"], alice.id.as_str());
    assert_eq!(body["data"]["full_name"], "Alice");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = create_test_app().await;

    app.server
        .get("/api/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, "Bearer not-a-jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;

    let response = app
        .server
        .put("/api/auth/profile")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "full_name": "Alice Liddell", "avatar": "https://img.example.com/a.png" }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["data"]["full_name"], "Alice Liddell");
    assert_eq!(body["data"]["avatar"], "https://img.example.com/a.png");

    // Empty avatar resets to the default.
    let response = app
        .server
        .put("/api/auth/profile")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "avatar": "" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["avatar"],
        DriveSettings::default().default_avatar.as_str()
    );
}

#[tokio::test]
async fn test_update_profile_rejects_blank_name() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;

    app.server
        .put("/api/auth/profile")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "full_name": "   " }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_session_rate_limit() {
    let mut config = create_test_config();
    config.session_rate_limit = 2;
    let app = create_test_app_with(config, DriveSettings::default()).await;

    for _ in 0..2 {
        app.server
            .post("/api/auth/session")
            .json(&json!({ "session": "unknown" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    let response = app
        .server
        .post("/api/auth/session")
        .json(&json!({ "session": "unknown" }))
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json::<Value>()["error"]["code"], "TOO_MANY_REQUESTS");
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = create_test_app().await;

    let response = app.server.get("/api/auth/me").await;
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
}
