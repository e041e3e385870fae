//! SQLite cache backend.
//!
//! Stores opaque values in `cache_entries` with an absolute expiry in unix
//! milliseconds. Expired rows are invisible to reads and removed by
//! [`SqliteBackend::purge_expired`], which also runs when the backend opens.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::{params, rusqlite};

use super::backend::CacheBackend;
use crate::db::Database;
use crate::Error;

pub struct SqliteBackend {
    db: Database,
    closed: AtomicBool,
}

impl SqliteBackend {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_database(Database::open(path).await?).await
    }

    pub async fn open_in_memory() -> Result<Self, Error> {
        Self::from_database(Database::open_in_memory().await?).await
    }

    pub async fn from_database(db: Database) -> Result<Self, Error> {
        let backend = Self { db, closed: AtomicBool::new(false) };
        let purged = backend.purge_expired().await?;
        if purged > 0 {
            tracing::info!(purged, "removed expired cache entries");
        }
        Ok(backend)
    }

    fn db(&self) -> Result<&Database, Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::CacheClosed);
        }
        Ok(&self.db)
    }

    /// Delete expired entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let now_ms = Utc::now().timestamp_millis();
        self.db()?
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE expires_at_ms <= ?1", params![now_ms])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored rows, expired or not.
    pub async fn len(&self) -> Result<u64, Error> {
        self.db()?
            .conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl CacheBackend for SqliteBackend {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    async fn probe(&self) -> Result<(), Error> {
        self.db()?
            .conn
            .call(|conn| -> Result<(), Error> {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let key = key.to_string();
        let now_ms = Utc::now().timestamp_millis();
        self.db()?
            .conn
            .call(move |conn| -> Result<Option<Vec<u8>>, Error> {
                let mut stmt =
                    conn.prepare("SELECT value FROM cache_entries WHERE key = ?1 AND expires_at_ms > ?2")?;

                match stmt.query_row(params![key, now_ms], |row| row.get(0)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_vec();
        let now = Utc::now();
        let stored_at = now.to_rfc3339();
        let expires_at_ms = now.timestamp_millis() + ttl.as_millis() as i64;

        self.db()?
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (key, value, stored_at, expires_at_ms)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        stored_at = excluded.stored_at,
                        expires_at_ms = excluded.expires_at_ms",
                    params![key, value, stored_at, expires_at_ms],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.db.close().await {
            tracing::warn!(error = %e, "failed to close sqlite cache");
        }
    }
}
