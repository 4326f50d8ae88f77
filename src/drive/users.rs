//! Users linked to backend accounts.

use serde_json::{json, Map};
use tracing::info;

use super::UserRecord;
use crate::backend::{Backend, Collection, Query};
use crate::{DriveError, Result};

/// Maximum full name length in characters.
pub const MAX_FULL_NAME_LENGTH: usize = 100;

/// User lookups and profile updates.
#[derive(Clone)]
pub struct UserService {
    backend: Backend,
    default_avatar: String,
}

impl UserService {
    pub fn new(backend: Backend, default_avatar: impl Into<String>) -> Self {
        Self {
            backend,
            default_avatar: default_avatar.into(),
        }
    }

    /// Resolve a backend session to its user document, creating the document
    /// on first sign-in.
    pub async fn resolve_session(&self, session: &str) -> Result<UserRecord> {
        let account = self.backend.accounts.get_account(session).await?;

        let existing = self
            .backend
            .documents
            .list_documents(
                Collection::Users,
                &[
                    Query::equal("accountId", [account.id.as_str()]),
                    Query::limit(1),
                ],
            )
            .await?;
        if let Some(doc) = existing.documents.first() {
            return Ok(UserRecord::from_document(doc));
        }

        let full_name = if account.name.trim().is_empty() {
            account
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            account.name.trim().to_string()
        };

        let mut data = Map::new();
        data.insert("fullName".to_string(), json!(full_name));
        // Shares match recipients by exact, lower-case email.
        data.insert("email".to_string(), json!(account.email.trim().to_lowercase()));
        data.insert("avatar".to_string(), json!(self.default_avatar));
        data.insert("accountId".to_string(), json!(account.id));

        let doc = self
            .backend
            .documents
            .create_document(Collection::Users, data)
            .await?;
        info!(user_id = %doc.id, account_id = %account.id, "User created");

        Ok(UserRecord::from_document(&doc))
    }

    pub async fn get(&self, id: &str) -> Result<UserRecord> {
        let doc = self
            .backend
            .documents
            .get_document(Collection::Users, id)
            .await?;
        Ok(UserRecord::from_document(&doc))
    }

    /// Update the full name and/or avatar.
    pub async fn update_profile(
        &self,
        user: &UserRecord,
        full_name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<UserRecord> {
        let mut patch = Map::new();

        if let Some(full_name) = full_name {
            let full_name = full_name.trim();
            if full_name.is_empty() {
                return Err(DriveError::Validation("full name is empty".to_string()));
            }
            if full_name.chars().count() > MAX_FULL_NAME_LENGTH {
                return Err(DriveError::Validation(format!(
                    "full name must be at most {MAX_FULL_NAME_LENGTH} characters"
                )));
            }
            patch.insert("fullName".to_string(), json!(full_name));
        }
        if let Some(avatar) = avatar {
            let avatar = avatar.trim();
            let avatar = if avatar.is_empty() {
                self.default_avatar.as_str()
            } else {
                avatar
            };
            patch.insert("avatar".to_string(), json!(avatar));
        }

        if patch.is_empty() {
            return Ok(user.clone());
        }

        let doc = self
            .backend
            .documents
            .update_document(Collection::Users, &user.id, patch)
            .await?;
        info!(user_id = %user.id, "Profile updated");

        Ok(UserRecord::from_document(&doc))
    }
}
