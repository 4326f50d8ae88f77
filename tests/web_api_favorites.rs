//! Web API Favorites Tests

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{create_test_app, file_ids, sign_in, upload_ok, TestApp, TestUser};

async fn favorite(app: &TestApp, user: &TestUser, file_id: &str) -> Value {
    let response = app
        .server
        .put(&format!("/api/favorites/{file_id}"))
        .add_header(AUTHORIZATION, user.bearer())
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

async fn favorite_ids(app: &TestApp, user: &TestUser) -> Vec<String> {
    let response = app
        .server
        .get("/api/favorites")
        .add_header(AUTHORIZATION, user.bearer())
        .await;
    response.assert_status_ok();
    file_ids(&response.json::<Value>())
}

async fn favorite_flag(app: &TestApp, user: &TestUser, file_id: &str) -> Value {
    let response = app
        .server
        .get(&format!("/api/files/{file_id}"))
        .add_header(AUTHORIZATION, user.bearer())
        .await;
    response.assert_status_ok();
    response.json::<Value>()["data"]["is_favorite"].clone()
}

#[tokio::test]
async fn test_add_favorite_is_idempotent() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let id = upload_ok(&app, &alice, "star.txt", b"star").await;

    let body = favorite(&app, &alice, &id).await;
    assert_eq!(body["data"]["file_id"], id.as_str());
    assert_eq!(body["data"]["favorite"], true);
    assert_eq!(body["data"]["changed"], true);

    let body = favorite(&app, &alice, &id).await;
    assert_eq!(body["data"]["changed"], false);

    assert_eq!(favorite_ids(&app, &alice).await, vec![id]);
}

#[tokio::test]
async fn test_remove_favorite() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let id = upload_ok(&app, &alice, "star.txt", b"star").await;
    favorite(&app, &alice, &id).await;

    let response = app
        .server
        .delete(&format!("/api/favorites/{id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["favorite"], false);
    assert_eq!(body["data"]["changed"], true);

    let response = app
        .server
        .delete(&format!("/api/favorites/{id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["changed"], false);

    assert!(favorite_ids(&app, &alice).await.is_empty());
}

#[tokio::test]
async fn test_favorites_keep_insertion_order() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let first = upload_ok(&app, &alice, "first.txt", b"1").await;
    let second = upload_ok(&app, &alice, "second.txt", b"2").await;
    let third = upload_ok(&app, &alice, "third.txt", b"3").await;

    favorite(&app, &alice, &second).await;
    favorite(&app, &alice, &third).await;
    favorite(&app, &alice, &first).await;

    assert_eq!(favorite_ids(&app, &alice).await, vec![second, third, first]);
}

#[tokio::test]
async fn test_trashed_favorites_are_hidden() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let keep = upload_ok(&app, &alice, "keep.txt", b"keep").await;
    let trash = upload_ok(&app, &alice, "trash.txt", b"trash").await;
    favorite(&app, &alice, &keep).await;
    favorite(&app, &alice, &trash).await;

    app.server
        .delete(&format!("/api/files/{trash}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status_ok();
    assert_eq!(favorite_ids(&app, &alice).await, vec![keep.clone()]);

    // Restoring brings the favorite back.
    app.server
        .post(&format!("/api/files/{trash}/restore"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status_ok();
    assert_eq!(favorite_ids(&app, &alice).await, vec![keep, trash]);
}

#[tokio::test]
async fn test_cannot_favorite_invisible_file() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let bob = sign_in(&app, "bob@example.com", "Bob").await;
    let id = upload_ok(&app, &alice, "private.txt", b"private").await;

    app.server
        .put(&format!("/api/favorites/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .put("/api/favorites/missing-file")
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert!(favorite_ids(&app, &bob).await.is_empty());
}

#[tokio::test]
async fn test_shared_favorite_hidden_after_unshare() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let bob = sign_in(&app, "bob@example.com", "Bob").await;
    let id = upload_ok(&app, &alice, "shared.txt", b"shared").await;

    app.server
        .put(&format!("/api/files/{id}/share"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "emails": [bob.email] }))
        .await
        .assert_status_ok();
    favorite(&app, &bob, &id).await;
    assert_eq!(favorite_ids(&app, &bob).await, vec![id.clone()]);

    // Sharing with nobody revokes Bob's access.
    app.server
        .put(&format!("/api/files/{id}/share"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "emails": [] }))
        .await
        .assert_status_ok();
    assert!(favorite_ids(&app, &bob).await.is_empty());
}

#[tokio::test]
async fn test_favorites_require_auth() {
    let app = create_test_app().await;

    app.server
        .get("/api/favorites")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_file_responses_flag_favorites() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let star = upload_ok(&app, &alice, "star.txt", b"star").await;
    let plain = upload_ok(&app, &alice, "plain.txt", b"plain").await;
    favorite(&app, &alice, &star).await;

    let response = app
        .server
        .get("/api/files")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    let body = response.json::<Value>();
    for file in body["data"]["files"].as_array().unwrap() {
        assert_eq!(file["is_favorite"], file["id"] == star.as_str());
    }

    assert_eq!(favorite_flag(&app, &alice, &star).await, true);
    assert_eq!(favorite_flag(&app, &alice, &plain).await, false);

    let response = app
        .server
        .get("/api/favorites")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    assert_eq!(response.json::<Value>()["data"][0]["is_favorite"], true);

    // Favorites are per user.
    app.server
        .put(&format!("/api/files/{star}/share"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "emails": ["bob@example.com"] }))
        .await
        .assert_status_ok();
    let bob = sign_in(&app, "bob@example.com", "Bob").await;
    assert_eq!(favorite_flag(&app, &bob, &star).await, false);
}
