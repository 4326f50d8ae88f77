//! Test helpers for HTTP API tests.
//!
//! Builds the router over an in-memory backend and database, and provides
//! sign-in and upload helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use cloudrive::backend::{
    Account, Backend, Collection, Document, DocumentList, DocumentStore, FileUrls, MemoryBackend,
    Query,
};
use cloudrive::config::WebConfig;
use cloudrive::drive::DriveSettings;
use cloudrive::mail::{EmailMessage, Mailer};
use cloudrive::web::middleware::JwtState;
use cloudrive::web::router::create_router;
use cloudrive::web::AppState;
use cloudrive::{Database, DriveError, Result};

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Records every message instead of sending it.
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// Document store over [`MemoryBackend`] whose file writes can be made to fail.
pub struct FlakyDocuments {
    inner: Arc<MemoryBackend>,
    pub fail_file_creates: AtomicBool,
    pub fail_file_updates: AtomicBool,
}

fn unavailable() -> DriveError {
    DriveError::Backend("503: service unavailable".to_string())
}

#[async_trait]
impl DocumentStore for FlakyDocuments {
    async fn create_document(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<Document> {
        if collection == Collection::Files && self.fail_file_creates.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.create_document(collection, data).await
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Document> {
        self.inner.get_document(collection, id).await
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList> {
        self.inner.list_documents(collection, queries).await
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document> {
        if collection == Collection::Files && self.fail_file_updates.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.update_document(collection, id, patch).await
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
        self.inner.delete_document(collection, id).await
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub memory: Arc<MemoryBackend>,
    pub documents: Arc<FlakyDocuments>,
    pub mailer: Arc<CapturingMailer>,
    pub urls: FileUrls,
}

pub fn create_test_config() -> WebConfig {
    WebConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_access_token_expiry_secs: 900,
        session_rate_limit: 100,
        api_rate_limit: 1000,
        ..Default::default()
    }
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(create_test_config(), DriveSettings::default()).await
}

pub async fn create_test_app_with(config: WebConfig, settings: DriveSettings) -> TestApp {
    let memory = Arc::new(MemoryBackend::new());
    let documents = Arc::new(FlakyDocuments {
        inner: memory.clone(),
        fail_file_creates: AtomicBool::new(false),
        fail_file_updates: AtomicBool::new(false),
    });
    let urls = FileUrls::new("https://baas.example.com/v1", "files", "proj").unwrap();
    let backend = Backend {
        documents: documents.clone(),
        storage: memory.clone(),
        accounts: memory.clone(),
        urls: urls.clone(),
    };

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let mailer = Arc::new(CapturingMailer::default());

    let app_state = Arc::new(AppState::new(
        backend,
        db,
        mailer.clone(),
        settings,
        &config.jwt_secret,
        config.jwt_access_token_expiry_secs,
    ));
    let jwt_state = Arc::new(JwtState::new(&config.jwt_secret));
    let router = create_router(app_state, jwt_state, &config);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        memory,
        documents,
        mailer,
        urls,
    }
}

/// A signed-in user.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Register a backend session for `email` and exchange it for an API token.
pub async fn sign_in(app: &TestApp, email: &str, name: &str) -> TestUser {
    let session = format!("session-{email}");
    app.memory
        .register_session(
            session.clone(),
            Account {
                id: format!("acc-{email}"),
                email: email.to_string(),
                name: name.to_string(),
            },
        )
        .await;

    let response = app
        .server
        .post("/api/auth/session")
        .json(&json!({ "session": session }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    TestUser {
        id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
        email: email.to_string(),
        token: body["data"]["access_token"].as_str().unwrap().to_string(),
    }
}

/// Upload `content` as `name`, optionally into a folder.
pub async fn upload(
    app: &TestApp,
    user: &TestUser,
    name: &str,
    content: &[u8],
    folder_id: Option<&str>,
) -> TestResponse {
    let mut form = MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec()).file_name(name.to_string()),
    );
    if let Some(folder_id) = folder_id {
        form = form.add_text("folder_id", folder_id.to_string());
    }

    app.server
        .post("/api/files")
        .add_header(AUTHORIZATION, user.bearer())
        .multipart(form)
        .await
}

/// Upload and return the created file's ID.
pub async fn upload_ok(app: &TestApp, user: &TestUser, name: &str, content: &[u8]) -> String {
    let response = upload(app, user, name, content, None).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// IDs of the files in a `{"data": {"files": [...]}}` or `{"data": [...]}` body.
pub fn file_ids(body: &Value) -> Vec<String> {
    let files = if body["data"].is_array() {
        &body["data"]
    } else {
        &body["data"]["files"]
    };
    files
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap().to_string())
        .collect()
}
