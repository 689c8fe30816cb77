// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase, sqlite::SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persistent key/value store for the little client state that must outlive
/// the process. Only the session token lives here today.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    /// Opens the storage database, creating it (and its directory) if needed.
    pub async fn open(database_url: &str) -> Result<Self> {
        if let Some(path) = database_file(database_url) {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create storage directory {}", parent.display())
                })?;
            }

            if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
                info!("Creating local storage {}", database_url);
                Sqlite::create_database(database_url)
                    .await
                    .context("Failed to create local storage database")?;
            } else {
                debug!("Local storage already exists.");
            }
        }

        // One connection is plenty for a single user, and it keeps an
        // in-memory database alive for as long as the pool is.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await
            .context("Failed to connect to local storage")?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, making sure the `local_storage` table exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create 'local_storage' table")?;

        debug!("'local_storage' table is ready.");

        Ok(Self { pool })
    }

    /// Returns the value stored under `key`, if any.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read '{key}' from local storage"))?;

        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write '{key}' to local storage"))?;

        debug!("Stored '{}' in local storage.", key);
        Ok(())
    }

    /// Removes `key`. Returns true if an entry was actually deleted.
    pub async fn remove_item(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove '{key}' from local storage"))?;

        let removed = result.rows_affected() > 0;
        debug!("Removed '{}' from local storage: {}", key, removed);
        Ok(removed)
    }
}

/// Extracts the file path from a `sqlite:` URL. `None` for in-memory databases.
fn database_file(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_test_storage() -> LocalStorage {
        LocalStorage::open("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let storage = setup_test_storage().await;
        assert_eq!(storage.get_item("access_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_overwrite_item() {
        let storage = setup_test_storage().await;

        storage.set_item("access_token", "first").await.unwrap();
        storage.set_item("access_token", "second").await.unwrap();

        assert_eq!(
            storage.get_item("access_token").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_remove_item() {
        let storage = setup_test_storage().await;
        storage.set_item("access_token", "abc").await.unwrap();

        assert!(storage.remove_item("access_token").await.unwrap());
        assert!(!storage.remove_item("access_token").await.unwrap());
        assert_eq!(storage.get_item("access_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_creates_database_file_and_directory() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("client.db");
        let url = format!("sqlite://{}", db_path.display());

        let storage = LocalStorage::open(&url).await.unwrap();
        storage.set_item("access_token", "persisted").await.unwrap();
        drop(storage);

        assert!(db_path.exists());

        // A second open sees what the first one wrote.
        let reopened = LocalStorage::open(&url).await.unwrap();
        assert_eq!(
            reopened.get_item("access_token").await.unwrap().as_deref(),
            Some("persisted")
        );
    }

    #[test]
    fn test_database_file_from_url() {
        assert_eq!(
            database_file("sqlite://database/client.db"),
            Some(PathBuf::from("database/client.db"))
        );
        assert_eq!(
            database_file("sqlite:client.db?mode=rwc"),
            Some(PathBuf::from("client.db"))
        );
        assert_eq!(database_file("sqlite::memory:"), None);
        assert_eq!(database_file("postgres://localhost/db"), None);
    }
}
