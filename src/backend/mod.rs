//! Typed client for the managed backend-as-a-service.
//!
//! The backend owns authentication, the document database and object storage.
//! This module exposes those capabilities behind three traits so the drive
//! services never depend on a concrete transport:
//! - [`DocumentStore`] for document CRUD and queries
//! - [`ObjectStorage`] for bucket uploads and deletes
//! - [`AccountService`] for resolving auth sessions
//!
//! [`RemoteBackend`] talks to the hosted service over HTTP, [`MemoryBackend`]
//! keeps everything in process for tests and local development.

mod document;
mod memory;
mod query;
mod remote;
mod urls;

pub use document::{timestamp, Account, Document, DocumentList, StoredObject};
pub use memory::MemoryBackend;
pub use query::Query;
pub use remote::RemoteBackend;
pub use urls::FileUrls;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::{BackendConfig, BackendMode};
use crate::Result;

/// Collections used by the drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Files,
    Folders,
    Users,
}

impl Collection {
    /// Singular label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Files => "file",
            Collection::Folders => "folder",
            Collection::Users => "user",
        }
    }
}

/// Document database operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a backend-generated ID.
    async fn create_document(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<Document>;

    /// Fetch a document; `DriveError::NotFound` if it does not exist.
    async fn get_document(&self, collection: Collection, id: &str) -> Result<Document>;

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList>;

    /// Merge `patch` into the document's attributes.
    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document>;

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()>;
}

/// Object storage operations on the configured bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn create_object(
        &self,
        name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<StoredObject>;

    async fn delete_object(&self, id: &str) -> Result<()>;
}

/// Authentication lookups.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Resolve a session secret to its account; `DriveError::Auth` if invalid.
    async fn get_account(&self, session: &str) -> Result<Account>;
}

/// Handle to every backend capability the drive needs.
#[derive(Clone)]
pub struct Backend {
    pub documents: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub accounts: Arc<dyn AccountService>,
    pub urls: FileUrls,
}

impl Backend {
    /// Build the backend selected by `config.mode`.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let urls = FileUrls::from_config(config)?;
        match config.mode {
            BackendMode::Remote => {
                let remote = Arc::new(RemoteBackend::new(config)?);
                Ok(Self {
                    documents: remote.clone(),
                    storage: remote.clone(),
                    accounts: remote,
                    urls,
                })
            }
            BackendMode::Memory => Ok(Self::memory(Arc::new(MemoryBackend::new()), urls)),
        }
    }

    /// Backend served entirely by an in-process [`MemoryBackend`].
    pub fn memory(memory: Arc<MemoryBackend>, urls: FileUrls) -> Self {
        Self {
            documents: memory.clone(),
            storage: memory.clone(),
            accounts: memory,
            urls,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("urls", &self.urls).finish()
    }
}
