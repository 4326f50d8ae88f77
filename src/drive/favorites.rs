//! Favorite files.

use std::collections::HashSet;

use super::{FileRecord, FileService, UserRecord};
use crate::backend::Query;
use crate::db::FavoriteRepository;
use crate::Result;

impl FileService {
    /// Mark a visible file as favorite. Returns `false` if it already was.
    pub async fn add_favorite(&self, user: &UserRecord, file_id: &str) -> Result<bool> {
        let file = self.get(user, file_id).await?;
        FavoriteRepository::new(self.db.pool())
            .add(&user.id, &file.id)
            .await
    }

    /// Unmark a favorite. Returns `false` if it was not one.
    pub async fn remove_favorite(&self, user: &UserRecord, file_id: &str) -> Result<bool> {
        FavoriteRepository::new(self.db.pool())
            .remove(&user.id, file_id)
            .await
    }

    pub async fn is_favorite(&self, user: &UserRecord, file_id: &str) -> Result<bool> {
        FavoriteRepository::new(self.db.pool())
            .is_favorite(&user.id, file_id)
            .await
    }

    /// IDs of every file the user marked, for flagging whole listings at once.
    pub async fn favorite_ids(&self, user: &UserRecord) -> Result<HashSet<String>> {
        let ids = FavoriteRepository::new(self.db.pool())
            .list(&user.id)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Favorite files still visible and not in the trash, in the order they were added.
    pub async fn favorites(&self, user: &UserRecord) -> Result<Vec<FileRecord>> {
        let ids = FavoriteRepository::new(self.db.pool())
            .list(&user.id)
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let queries = [
            Query::equal("$id", ids.iter().map(String::as_str)),
            Query::or(vec![
                Query::equal("owner", [user.id.as_str()]),
                Query::contains("users", [user.email.as_str()]),
            ]),
            Query::equal("isDeleted", [false]),
        ];
        let mut files = self.query(&queries).await?.files;
        files.sort_by_key(|f| ids.iter().position(|id| id == &f.id));

        Ok(files)
    }
}
