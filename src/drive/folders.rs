//! Folder operations.

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{build_file_queries, FileFilter, FileRecord, FolderRecord, UserRecord};
use crate::backend::{timestamp, Backend, Collection, Query};
use crate::{DriveError, Result};

/// Maximum folder name length in characters.
pub const MAX_FOLDER_NAME_LENGTH: usize = 128;

/// A folder with the files placed in it.
#[derive(Debug, Clone)]
pub struct FolderDetail {
    pub folder: FolderRecord,
    pub files: Vec<FileRecord>,
}

/// Folder operations for a single backend.
#[derive(Clone)]
pub struct FolderService {
    backend: Backend,
}

impl FolderService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Create a folder owned by `user`.
    pub async fn create(&self, user: &UserRecord, name: &str) -> Result<FolderRecord> {
        let name = validate_folder_name(name)?;
        let now = timestamp(&Utc::now());

        let mut data = Map::new();
        data.insert("name".to_string(), json!(name));
        data.insert("ownerId".to_string(), json!(user.id));
        data.insert("createdAt".to_string(), json!(now));
        data.insert("updatedAt".to_string(), json!(now));

        let doc = self
            .backend
            .documents
            .create_document(Collection::Folders, data)
            .await?;
        info!(folder_id = %doc.id, owner = %user.id, "Folder created");

        Ok(FolderRecord::from_document(&doc))
    }

    /// Folders owned by `user`, newest first.
    pub async fn list(&self, user: &UserRecord) -> Result<Vec<FolderRecord>> {
        let list = self
            .backend
            .documents
            .list_documents(
                Collection::Folders,
                &[
                    Query::equal("ownerId", [user.id.as_str()]),
                    Query::order_desc("$createdAt"),
                ],
            )
            .await?;

        Ok(list.documents.iter().map(FolderRecord::from_document).collect())
    }

    /// An owned folder and its non-deleted files.
    pub async fn get(&self, user: &UserRecord, id: &str) -> Result<FolderDetail> {
        let folder = fetch_owned_folder(&self.backend, user, id).await?;

        let filter = FileFilter {
            folder_id: Some(folder.id.clone()),
            ..Default::default()
        };
        let mut queries = build_file_queries(user, &filter);
        queries.push(Query::equal("isDeleted", [false]));

        let list = self
            .backend
            .documents
            .list_documents(Collection::Files, &queries)
            .await?;

        Ok(FolderDetail {
            folder,
            files: list.documents.iter().map(FileRecord::from_document).collect(),
        })
    }

    /// Delete an owned folder; the owner's files in it are moved out.
    ///
    /// Files are detached before the folder document goes, so a failure
    /// part way leaves the folder in place and the delete can be retried.
    /// Returns the number of files detached.
    pub async fn delete(&self, user: &UserRecord, id: &str) -> Result<usize> {
        let folder = fetch_owned_folder(&self.backend, user, id).await?;

        let contained = self
            .backend
            .documents
            .list_documents(
                Collection::Files,
                &[
                    Query::equal("owner", [user.id.as_str()]),
                    Query::equal("folderId", [folder.id.as_str()]),
                ],
            )
            .await?;

        let mut patch = Map::new();
        patch.insert("folderId".to_string(), Value::Null);
        for doc in &contained.documents {
            self.backend
                .documents
                .update_document(Collection::Files, &doc.id, patch.clone())
                .await?;
        }

        self.backend
            .documents
            .delete_document(Collection::Folders, &folder.id)
            .await?;

        info!(
            folder_id = %folder.id,
            detached = contained.documents.len(),
            "Folder deleted"
        );
        Ok(contained.documents.len())
    }
}

/// Fetch a folder owned by `user`; other users' folders are reported as missing.
pub(super) async fn fetch_owned_folder(
    backend: &Backend,
    user: &UserRecord,
    id: &str,
) -> Result<FolderRecord> {
    let doc = backend
        .documents
        .get_document(Collection::Folders, id)
        .await?;
    let folder = FolderRecord::from_document(&doc);

    if folder.owner_id != user.id {
        return Err(DriveError::NotFound("folder".to_string()));
    }
    Ok(folder)
}

fn validate_folder_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DriveError::Validation("folder name is empty".to_string()));
    }
    if name.chars().count() > MAX_FOLDER_NAME_LENGTH {
        return Err(DriveError::Validation(format!(
            "folder name must be at most {MAX_FOLDER_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}
