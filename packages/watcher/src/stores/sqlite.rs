//! SQLite seen store.
//!
//! The production backend. One row per notified listing in the `sent` table;
//! rows are never updated or deleted.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::error::StorageError;
use crate::kernel::BaseSeenStore;
use crate::listings::{ListingRecord, SeenRecord};

pub struct SqliteSeenStore {
    pool: SqlitePool,
}

impl SqliteSeenStore {
    /// Open (and create if needed) a SQLite store.
    ///
    /// # Example URLs
    /// - `sqlite:sent_offers.db?mode=rwc` - File-based, created if missing
    /// - `sqlite:/var/lib/watcher/seen.db` - Existing file
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Pinned to a single connection that never expires: every SQLite
    /// connection to `:memory:` is its own database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sent (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                ts INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl BaseSeenStore for SqliteSeenStore {
    async fn has_seen(&self, id: &str) -> Result<bool, StorageError> {
        let row = sqlx::query_scalar::<_, i64>("SELECT 1 FROM sent WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn mark_seen(&self, listing: &ListingRecord) -> Result<(), StorageError> {
        // Insert-if-absent in one statement; each insert commits on its own.
        let result = sqlx::query("INSERT OR IGNORE INTO sent (id, url, title, ts) VALUES (?, ?, ?, ?)")
            .bind(&listing.id)
            .bind(&listing.url)
            .bind(&listing.title)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;

        debug!(
            listing_id = %listing.id,
            inserted = result.rows_affected() == 1,
            "Recorded listing as seen"
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SeenRecord>, StorageError> {
        let record = sqlx::query_as::<_, SeenRecord>("SELECT id, url, title, ts FROM sent WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sent")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
