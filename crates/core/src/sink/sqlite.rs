//! SQLite-backed log sink.

use async_trait::async_trait;
use tokio_rusqlite::params;

use super::{LogEntry, LogRecord, LogSink, MAX_QUERY_LIMIT};
use crate::db::Database;
use crate::Error;

#[derive(Clone, Debug)]
pub struct SqliteLogSink {
    db: Database,
}

impl SqliteLogSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LogSink for SqliteLogSink {
    async fn append(&self, entry: &LogEntry) -> Result<(), Error> {
        let entry = entry.clone();
        let created_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO ocr_log (
                        file_name, extracted_text, file_size, mime_type, processing_time_ms, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        &entry.file_name,
                        &entry.extracted_text,
                        entry.file_size as i64,
                        &entry.mime_type,
                        entry.processing_time_ms as i64,
                        created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn query(&self, limit: usize) -> Result<Vec<LogRecord>, Error> {
        let limit = limit.min(MAX_QUERY_LIMIT) as i64;
        self.db
            .conn
            .call(move |conn| -> Result<Vec<LogRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, file_name, extracted_text, file_size, mime_type, processing_time_ms, created_at
                    FROM ocr_log ORDER BY id DESC LIMIT ?1",
                )?;

                let rows = stmt.query_map(params![limit], |row| {
                    Ok(LogRecord {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                        extracted_text: row.get(2)?,
                        file_size: row.get::<_, i64>(3)? as u64,
                        mime_type: row.get(4)?,
                        processing_time_ms: row.get::<_, i64>(5)? as u64,
                        created_at: row.get(6)?,
                    })
                })?;

                let mut records = Vec::new();
                for row in rows {
                    records.push(row?);
                }
                Ok(records)
            })
            .await
            .map_err(Error::from)
    }
}
