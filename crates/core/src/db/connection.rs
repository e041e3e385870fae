//! SQLite connection management with pragma configuration.
//!
//! Opens the database, applies pragmas for concurrent access (WAL mode) and
//! runs migrations. Both the local cache backend and the OCR log sink share
//! this handle type.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// SQLite database handle.
///
/// Wraps a tokio-rusqlite Connection that runs statements on a background
/// thread. Cloning is cheap and shares the same connection.
#[derive(Clone, Debug)]
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas and runs any
    /// pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database, used by tests and ephemeral caches.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Close the background connection.
    ///
    /// Other clones of this handle fail with `ConnectionClosed` afterwards.
    pub async fn close(&self) -> Result<(), Error> {
        self.conn.clone().close().await.map_err(Error::from)
    }
}
