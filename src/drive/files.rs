//! File operations: upload, listing, rename, share, delete/restore, usage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use validator::ValidateEmail;

use super::folders::fetch_owned_folder;
use super::{
    build_file_queries, hash_share_password, DriveSettings, FileFilter, FileRecord, FileType,
    ShareOptions, SharedUser, UsageSummary, UserRecord,
};
use crate::backend::{timestamp, Backend, Collection, Query};
use crate::db::{Database, FavoriteRepository};
use crate::mail::{Mailer, ShareEmail};
use crate::{DriveError, Result};

/// Maximum file name length in characters.
const MAX_FILE_NAME_LENGTH: usize = 255;

/// One page of files.
#[derive(Debug, Clone)]
pub struct FileList {
    /// Number of matching files, ignoring the limit.
    pub total: u64,
    pub files: Vec<FileRecord>,
}

/// File operations.
#[derive(Clone)]
pub struct FileService {
    pub(super) backend: Backend,
    pub(super) db: Database,
    mailer: Arc<dyn Mailer>,
    settings: DriveSettings,
}

impl FileService {
    pub fn new(
        backend: Backend,
        db: Database,
        mailer: Arc<dyn Mailer>,
        settings: DriveSettings,
    ) -> Self {
        Self {
            backend,
            db,
            mailer,
            settings,
        }
    }

    pub fn settings(&self) -> &DriveSettings {
        &self.settings
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Store `content` and create its file document.
    ///
    /// If the document cannot be created the stored object is removed again.
    pub async fn upload(
        &self,
        user: &UserRecord,
        name: &str,
        content: Vec<u8>,
        folder_id: Option<&str>,
    ) -> Result<FileRecord> {
        let name = validate_file_name(name)?;
        if content.is_empty() {
            return Err(DriveError::Validation("file is empty".to_string()));
        }
        if content.len() as u64 > self.settings.max_upload_bytes {
            return Err(DriveError::Validation(format!(
                "file exceeds maximum size of {} bytes",
                self.settings.max_upload_bytes
            )));
        }
        if let Some(folder_id) = folder_id {
            fetch_owned_folder(&self.backend, user, folder_id).await?;
        }

        let content_type = mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string();
        let stored = self
            .backend
            .storage
            .create_object(name, &content_type, content)
            .await?;
        let (file_type, extension) = FileType::classify(&stored.name);

        let mut data = Map::new();
        data.insert("type".to_string(), json!(file_type.as_str()));
        data.insert("name".to_string(), json!(stored.name));
        data.insert(
            "url".to_string(),
            json!(self.backend.urls.view_url(&stored.id)),
        );
        data.insert("extension".to_string(), json!(extension));
        data.insert("size".to_string(), json!(stored.size_original));
        data.insert("owner".to_string(), json!(user.id));
        data.insert("accountId".to_string(), json!(user.account_id));
        data.insert("users".to_string(), json!([]));
        data.insert("bucketFileId".to_string(), json!(stored.id));
        data.insert("isDeleted".to_string(), json!(false));
        if let Some(folder_id) = folder_id {
            data.insert("folderId".to_string(), json!(folder_id));
        }

        match self
            .backend
            .documents
            .create_document(Collection::Files, data)
            .await
        {
            Ok(doc) => {
                info!(file_id = %doc.id, owner = %user.id, size = stored.size_original, "File uploaded");
                Ok(FileRecord::from_document(&doc))
            }
            Err(e) => {
                error!(error = %e, bucket_file_id = %stored.id, "Failed to create file document");
                if let Err(cleanup) = self.backend.storage.delete_object(&stored.id).await {
                    warn!(error = %cleanup, bucket_file_id = %stored.id, "Failed to remove orphaned object");
                }
                Err(e)
            }
        }
    }

    /// Visible, not deleted files matching `filter`.
    pub async fn list(&self, user: &UserRecord, filter: &FileFilter) -> Result<FileList> {
        let mut queries = build_file_queries(user, filter);
        queries.push(Query::equal("isDeleted", [false]));
        self.query(&queries).await
    }

    /// Visible soft-deleted files, most recently changed first.
    pub async fn list_trash(&self, user: &UserRecord) -> Result<FileList> {
        let filter = FileFilter {
            sort: "$updatedAt-desc".parse()?,
            ..Default::default()
        };
        let mut queries = build_file_queries(user, &filter);
        queries.push(Query::equal("isDeleted", [true]));
        self.query(&queries).await
    }

    /// A file visible to `user`.
    pub async fn get(&self, user: &UserRecord, id: &str) -> Result<FileRecord> {
        let doc = self
            .backend
            .documents
            .get_document(Collection::Files, id)
            .await?;
        let file = FileRecord::from_document(&doc);

        if !file.is_visible_to(user) {
            return Err(DriveError::NotFound("file".to_string()));
        }
        Ok(file)
    }

    /// Rename to `"{name}.{extension}"`.
    pub async fn rename(
        &self,
        user: &UserRecord,
        id: &str,
        name: &str,
        extension: &str,
    ) -> Result<FileRecord> {
        let file = self.get(user, id).await?;
        if !file.can_write(user) {
            return Err(DriveError::Permission(
                "you cannot rename this file".to_string(),
            ));
        }

        let name = name.trim();
        let extension = extension.trim().trim_start_matches('.');
        let new_name = if extension.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{extension}")
        };
        let new_name = validate_file_name(&new_name)?;

        let mut patch = Map::new();
        patch.insert("name".to_string(), json!(new_name));
        let doc = self
            .backend
            .documents
            .update_document(Collection::Files, &file.id, patch)
            .await?;

        info!(file_id = %file.id, name = %new_name, "File renamed");
        Ok(FileRecord::from_document(&doc))
    }

    /// Share a file with `emails`, replacing any previous recipients, and
    /// notify each recipient by email.
    pub async fn share(
        &self,
        user: &UserRecord,
        id: &str,
        emails: &[String],
        options: &ShareOptions,
    ) -> Result<FileRecord> {
        let emails = normalize_emails(emails)?;
        let expiry = options
            .expiry_date
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(parse_expiry)
            .transpose()?;
        let password = options.password.as_deref().filter(|p| !p.is_empty());
        let password_hash = password.map(hash_share_password).transpose()?;

        let file = self.get(user, id).await?;
        if !file.is_owner(user) {
            return Err(DriveError::Permission(
                "only the owner can share this file".to_string(),
            ));
        }

        let permission = options.permission.unwrap_or_default();
        let added_at = timestamp(&Utc::now());
        let user_permissions: Vec<SharedUser> = emails
            .iter()
            .map(|email| SharedUser {
                email: email.clone(),
                permission,
                added_at: added_at.clone(),
            })
            .collect();

        let mut patch = Map::new();
        patch.insert("users".to_string(), json!(emails));
        patch.insert(
            "userPermissions".to_string(),
            json!(serde_json::to_string(&user_permissions)?),
        );
        patch.insert("shareStatsViews".to_string(), json!(0));
        patch.insert("shareStatsDownloads".to_string(), json!(0));
        patch.insert("shareStatsLastAccessed".to_string(), Value::Null);
        if let Some(hash) = password_hash {
            patch.insert("sharePassword".to_string(), json!(hash));
        }
        if let Some(expiry) = &expiry {
            patch.insert("shareExpiryDate".to_string(), json!(timestamp(expiry)));
        }
        if let Some(permission) = options.permission {
            patch.insert("sharePermission".to_string(), json!(permission.as_str()));
        }

        let doc = self
            .backend
            .documents
            .update_document(Collection::Files, &file.id, patch)
            .await?;
        let shared = FileRecord::from_document(&doc);
        info!(file_id = %shared.id, recipients = emails.len(), "File shared");

        let file_url = self.backend.urls.view_url(&shared.bucket_file_id);
        for recipient in &user_permissions {
            let email = ShareEmail {
                to: recipient.email.clone(),
                file_name: shared.name.clone(),
                file_url: file_url.clone(),
                sender_name: user.full_name.clone(),
                password: password.map(str::to_string),
                expiry_date: expiry.as_ref().map(timestamp),
                permission: recipient.permission,
            };
            let message = email.to_message(self.settings.timezone);
            if let Err(e) = self.mailer.send(&message).await {
                error!(error = %e, to = %recipient.email, "Failed to send share email");
            }
        }

        Ok(shared)
    }

    /// Move an owned file to the trash.
    pub async fn soft_delete(&self, user: &UserRecord, id: &str) -> Result<FileRecord> {
        let file = self.get_owned(user, id).await?;

        let mut patch = Map::new();
        patch.insert("isDeleted".to_string(), json!(true));
        patch.insert("deletedAt".to_string(), json!(timestamp(&Utc::now())));
        let doc = self
            .backend
            .documents
            .update_document(Collection::Files, &file.id, patch)
            .await?;

        info!(file_id = %file.id, "File moved to trash");
        Ok(FileRecord::from_document(&doc))
    }

    /// Bring an owned file back from the trash.
    pub async fn restore(&self, user: &UserRecord, id: &str) -> Result<FileRecord> {
        let file = self.get_owned(user, id).await?;

        let mut patch = Map::new();
        patch.insert("isDeleted".to_string(), json!(false));
        patch.insert("deletedAt".to_string(), Value::Null);
        let doc = self
            .backend
            .documents
            .update_document(Collection::Files, &file.id, patch)
            .await?;

        info!(file_id = %file.id, "File restored");
        Ok(FileRecord::from_document(&doc))
    }

    /// Permanently remove an owned file: document, stored object and favorites.
    pub async fn hard_delete(&self, user: &UserRecord, id: &str) -> Result<()> {
        let file = self.get_owned(user, id).await?;

        self.backend
            .documents
            .delete_document(Collection::Files, &file.id)
            .await?;
        let object_result = self
            .backend
            .storage
            .delete_object(&file.bucket_file_id)
            .await;
        let removed = FavoriteRepository::new(self.db.pool())
            .remove_file(&file.id)
            .await?;
        debug!(file_id = %file.id, removed, "Cleared favorites");

        if let Err(e) = &object_result {
            error!(error = %e, bucket_file_id = %file.bucket_file_id, "Failed to delete stored object");
        } else {
            info!(file_id = %file.id, "File permanently deleted");
        }
        object_result
    }

    /// Storage used by the files `user` owns, trash included.
    pub async fn usage(&self, user: &UserRecord) -> Result<UsageSummary> {
        let list = self
            .query(&[Query::equal("owner", [user.id.as_str()])])
            .await?;
        Ok(UsageSummary::from_files(
            &list.files,
            self.settings.storage_quota_bytes,
        ))
    }

    async fn get_owned(&self, user: &UserRecord, id: &str) -> Result<FileRecord> {
        let file = self.get(user, id).await?;
        if !file.is_owner(user) {
            return Err(DriveError::Permission(
                "only the owner can modify this file".to_string(),
            ));
        }
        Ok(file)
    }

    pub(super) async fn query(&self, queries: &[Query]) -> Result<FileList> {
        let list = self
            .backend
            .documents
            .list_documents(Collection::Files, queries)
            .await?;

        Ok(FileList {
            total: list.total,
            files: list.documents.iter().map(FileRecord::from_document).collect(),
        })
    }
}

fn validate_file_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DriveError::Validation("file name is empty".to_string()));
    }
    if name.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(DriveError::Validation(format!(
            "file name must be at most {MAX_FILE_NAME_LENGTH} characters"
        )));
    }
    if name.contains(['/', '\\']) {
        return Err(DriveError::Validation(
            "file name must not contain path separators".to_string(),
        ));
    }
    Ok(name)
}

/// Validate recipient emails and lower-case them, dropping duplicates but
/// keeping their order.
fn normalize_emails(emails: &[String]) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(emails.len());
    for email in emails {
        let email = email.trim();
        if email.is_empty() {
            continue;
        }
        if !email.validate_email() {
            return Err(DriveError::Validation(format!(
                "invalid email address: {email}"
            )));
        }
        let email = email.to_lowercase();
        if !normalized.contains(&email) {
            normalized.push(email);
        }
    }
    Ok(normalized)
}

fn parse_expiry(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DriveError::Validation(format!("invalid expiry date: {value}")))
}
