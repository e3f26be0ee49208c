//! Durable storage behind a [`Store`](super::Store)
//!
//! Backends hold whole serialized values keyed by cell key. They know nothing
//! about shapes, defaults or subscribers.

use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Every persisted cell as `key -> serialized value`
    async fn load_all(&self) -> Result<HashMap<String, String>>;

    /// Replace the stored value of `key`
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile backend
///
/// Several stores opened on one `Arc<MemoryBackend>` behave like tabs sharing
/// one browser profile.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    cells: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with raw stored text, e.g. data written by an
    /// older build
    pub fn with_cells<I, K, V>(cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: Mutex::new(
                cells
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Raw stored text of one key
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.cells.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load_all(&self) -> Result<HashMap<String, String>> {
        Ok(self.cells.lock().await.clone())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.cells
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.cells.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(feature = "sqlx")]
pub use sqlite::SqliteBackend;

#[cfg(feature = "sqlx")]
mod sqlite {
    use super::StorageBackend;
    use crate::db::CellRow;
    use crate::Result;
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::collections::HashMap;

    /// Backend over the `cells` table
    #[derive(Clone)]
    pub struct SqliteBackend {
        pool: SqlitePool,
    }

    impl SqliteBackend {
        /// Wrap a pool whose schema has been prepared by `db::init_database`
        pub fn new(pool: SqlitePool) -> Self {
            Self { pool }
        }

        pub fn pool(&self) -> &SqlitePool {
            &self.pool
        }

        /// Number of writes ever applied to `key`
        pub async fn revision(&self, key: &str) -> Result<Option<i64>> {
            let revision = sqlx::query_scalar("SELECT revision FROM cells WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
            Ok(revision)
        }
    }

    #[async_trait]
    impl StorageBackend for SqliteBackend {
        async fn load_all(&self) -> Result<HashMap<String, String>> {
            let rows: Vec<CellRow> = sqlx::query_as("SELECT key, value, revision FROM cells")
                .fetch_all(&self.pool)
                .await?;

            Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
        }

        async fn put(&self, key: &str, value: &str) -> Result<()> {
            sqlx::query(
                r#"
                INSERT INTO cells (key, value, revision, updated_at)
                VALUES (?, ?, 1, CURRENT_TIMESTAMP)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    revision = cells.revision + 1,
                    updated_at = CURRENT_TIMESTAMP
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            sqlx::query("DELETE FROM cells WHERE key = ?")
                .bind(key)
                .execute(&self.pool)
                .await?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_put_remove() {
        let backend = MemoryBackend::with_cells([("releasio-plan", "\"Free\"")]);
        backend.put("releasio-view", "\"dashboard\"").await.unwrap();
        backend.remove("releasio-plan").await.unwrap();
        backend.remove("never-written").await.unwrap();

        let all = backend.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(backend.raw("releasio-view").await.as_deref(), Some("\"dashboard\""));
    }

    #[cfg(feature = "sqlx")]
    #[tokio::test]
    async fn test_sqlite_backend_counts_revisions() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::prepare_schema(&pool).await.unwrap();
        let backend = SqliteBackend::new(pool);

        backend.put("releasio-selected-artist-id", "1").await.unwrap();
        backend.put("releasio-selected-artist-id", "7").await.unwrap();

        assert_eq!(backend.revision("releasio-selected-artist-id").await.unwrap(), Some(2));
        let all = backend.load_all().await.unwrap();
        assert_eq!(all.get("releasio-selected-artist-id").map(String::as_str), Some("7"));

        backend.remove("releasio-selected-artist-id").await.unwrap();
        assert_eq!(backend.revision("releasio-selected-artist-id").await.unwrap(), None);
    }
}
