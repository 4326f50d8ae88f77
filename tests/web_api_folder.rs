//! Web API Folder Tests

mod common;

use std::sync::atomic::Ordering;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{create_test_app, file_ids, sign_in, upload, upload_ok, TestApp, TestUser};

async fn create_folder(app: &TestApp, user: &TestUser, name: &str) -> String {
    let response = app
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, user.bearer())
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn upload_into(app: &TestApp, user: &TestUser, name: &str, folder_id: &str) -> String {
    let response = upload(app, user, name, b"content", Some(folder_id)).await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["folder_id"], folder_id);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_and_list_folders() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let bob = sign_in(&app, "bob@example.com", "Bob").await;

    let photos = create_folder(&app, &alice, "  Photos ").await;
    let work = create_folder(&app, &alice, "Work").await;
    create_folder(&app, &bob, "Bob's stuff").await;

    let response = app
        .server
        .get("/api/folders")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let folders = body["data"].as_array().unwrap();
    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0]["id"], work.as_str());
    assert_eq!(folders[1]["id"], photos.as_str());
    assert_eq!(folders[1]["name"], "Photos");
}

#[tokio::test]
async fn test_create_folder_validation() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;

    for name in ["", "   ", "tab\there"] {
        app.server
            .post("/api/folders")
            .add_header(AUTHORIZATION, alice.bearer())
            .json(&json!({ "name": name }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn test_folder_detail_lists_its_files() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let folder = create_folder(&app, &alice, "Docs").await;

    let inside = upload_into(&app, &alice, "inside.txt", &folder).await;
    let trashed = upload_into(&app, &alice, "trashed.txt", &folder).await;
    upload_ok(&app, &alice, "outside.txt", b"outside").await;

    app.server
        .delete(&format!("/api/files/{trashed}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status_ok();

    let response = app
        .server
        .get(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["data"]["folder"]["name"], "Docs");
    let files: Vec<&str> = body["data"]["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(files, vec![inside.as_str()]);

    // The same files through the list filter.
    let response = app
        .server
        .get("/api/files")
        .add_query_param("folder_id", &folder)
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    assert_eq!(file_ids(&response.json::<Value>()), vec![inside]);
}

#[tokio::test]
async fn test_other_users_folder_is_not_found() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let bob = sign_in(&app, "bob@example.com", "Bob").await;
    let folder = create_folder(&app, &alice, "Private").await;

    app.server
        .get(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .delete(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    upload(&app, &bob, "intruder.txt", b"hi", Some(folder.as_str()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_folder_detaches_files() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let folder = create_folder(&app, &alice, "Old").await;

    let first = upload_into(&app, &alice, "one.txt", &folder).await;
    let second = upload_into(&app, &alice, "two.txt", &folder).await;

    let response = app
        .server
        .delete(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["detached_files"], 2);

    app.server
        .get(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .get("/api/files")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    let body = response.json::<Value>();
    assert_eq!(file_ids(&body), vec![second, first]);
    for file in body["data"]["files"].as_array().unwrap() {
        assert!(file["folder_id"].is_null());
    }
}

#[tokio::test]
async fn test_failed_folder_delete_keeps_folder() {
    let app = create_test_app().await;
    let alice = sign_in(&app, "alice@example.com", "Alice").await;
    let folder = create_folder(&app, &alice, "Keep").await;
    let file = upload_into(&app, &alice, "inside.txt", &folder).await;

    app.documents.fail_file_updates.store(true, Ordering::SeqCst);
    app.server
        .delete(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    app.documents.fail_file_updates.store(false, Ordering::SeqCst);

    // Nothing points at a missing folder.
    app.server
        .get(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status_ok();
    let response = app
        .server
        .get(&format!("/api/files/{file}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    assert_eq!(response.json::<Value>()["data"]["folder_id"], folder.as_str());

    let response = app
        .server
        .delete(&format!("/api/folders/{folder}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["detached_files"], 1);
}
