//! In-process backend.
//!
//! Evaluates [`Query`] clauses the same way the hosted database does for the
//! subset the drive uses: `equal`, `contains`, `or`, ordering and `limit`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::query::compare_attribute;
use super::{
    Account, AccountService, Collection, Document, DocumentList, DocumentStore, ObjectStorage,
    Query, StoredObject,
};
use crate::{DriveError, Result};

struct MemoryObject {
    meta: StoredObject,
    content: Vec<u8>,
}

/// Backend that keeps documents, objects and sessions in memory.
#[derive(Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<Collection, Vec<Document>>>,
    objects: RwLock<HashMap<String, MemoryObject>>,
    sessions: RwLock<HashMap<String, Account>>,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `session` resolve to `account`.
    pub async fn register_session(&self, session: impl Into<String>, account: Account) {
        self.sessions.write().await.insert(session.into(), account);
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn object_meta(&self, id: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(id)
            .map(|object| object.meta.clone())
    }

    pub async fn object_content(&self, id: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(id)
            .map(|object| object.content.clone())
    }

    pub async fn document_count(&self, collection: Collection) -> usize {
        self.documents
            .read()
            .await
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Strictly increasing millisecond timestamps, so creation order is
    /// observable through the `$createdAt`/`$updatedAt` wire strings.
    async fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock().await;
        let mut now = Utc::now().trunc_subsecs(3);
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::milliseconds(1);
            }
        }
        *last = Some(now);
        now
    }

    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..20].to_string()
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_document(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<Document> {
        let now = self.next_timestamp().await;
        let document = Document {
            id: Self::generate_id(),
            created_at: now,
            updated_at: now,
            data,
        };

        self.documents
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Document> {
        self.documents
            .read()
            .await
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned()
            .ok_or_else(|| DriveError::NotFound(collection.label().to_string()))
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let mut matched: Vec<Document> = self
            .documents
            .read()
            .await
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| queries.iter().all(|q| q.matches(d)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Later order clauses only break ties of earlier ones.
        for query in queries.iter().rev() {
            match query {
                Query::OrderAsc(attr) => matched.sort_by(|a, b| compare_attribute(a, b, attr)),
                Query::OrderDesc(attr) => matched.sort_by(|a, b| compare_attribute(b, a, attr)),
                _ => {}
            }
        }

        let total = matched.len() as u64;
        let limit = queries.iter().find_map(|q| match q {
            Query::Limit(n) => Some(*n),
            _ => None,
        });
        if let Some(limit) = limit {
            matched.truncate(limit);
        }

        Ok(DocumentList {
            total,
            documents: matched,
        })
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document> {
        let now = self.next_timestamp().await;
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| DriveError::NotFound(collection.label().to_string()))?;

        for (key, value) in patch {
            document.data.insert(key, value);
        }
        document.updated_at = now;

        Ok(document.clone())
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        let docs = documents
            .get_mut(&collection)
            .ok_or_else(|| DriveError::NotFound(collection.label().to_string()))?;

        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(DriveError::NotFound(collection.label().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MemoryBackend {
    async fn create_object(
        &self,
        name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<StoredObject> {
        let meta = StoredObject {
            id: Self::generate_id(),
            name: name.to_string(),
            size_original: content.len() as u64,
            mime_type: content_type.to_string(),
        };

        self.objects.write().await.insert(
            meta.id.clone(),
            MemoryObject {
                meta: meta.clone(),
                content,
            },
        );

        Ok(meta)
    }

    async fn delete_object(&self, id: &str) -> Result<()> {
        self.objects
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DriveError::NotFound("stored object".to_string()))
    }
}

#[async_trait]
impl AccountService for MemoryBackend {
    async fn get_account(&self, session: &str) -> Result<Account> {
        self.sessions
            .read()
            .await
            .get(session)
            .cloned()
            .ok_or_else(|| DriveError::Auth("invalid session".to_string()))
    }
}
