//! Favorites repository.

use super::DbPool;
use crate::Result;

/// Repository for the per-user favorites set.
pub struct FavoriteRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Add a file to the user's favorites.
    ///
    /// Returns `false` if it was already a favorite.
    pub async fn add(&self, user_id: &str, file_id: &str) -> Result<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO favorites (user_id, file_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(file_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a file from the user's favorites.
    ///
    /// Returns `false` if it was not a favorite.
    pub async fn remove(&self, user_id: &str, file_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND file_id = $2")
            .bind(user_id)
            .bind(file_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_favorite(&self, user_id: &str, file_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND file_id = $2)",
        )
        .bind(user_id)
        .bind(file_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// File IDs favorited by the user, oldest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar("SELECT file_id FROM favorites WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }

    /// Drop a file from every user's favorites.
    pub async fn remove_file(&self, file_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE file_id = $1")
            .bind(file_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
