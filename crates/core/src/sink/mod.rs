//! OCR log sink.
//!
//! Every completed extraction is appended to a relational log. The log is a
//! non-critical dependency: callers log append failures and move on.

mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

pub use sqlite::SqliteLogSink;

/// Largest page [`LogSink::query`] will return.
pub const MAX_QUERY_LIMIT: usize = 500;

/// One extraction to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub file_name: String,
    pub extracted_text: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    pub processing_time_ms: u64,
}

/// A stored log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: i64,
    pub file_name: String,
    pub extracted_text: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    pub processing_time_ms: u64,
    pub created_at: String,
}

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<(), Error>;

    /// Most recent records first, at most `limit` (capped at [`MAX_QUERY_LIMIT`]).
    async fn query(&self, limit: usize) -> Result<Vec<LogRecord>, Error>;
}

/// Stand-in used when the log store could not be opened at startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLogSink;

#[async_trait]
impl LogSink for DisabledLogSink {
    async fn append(&self, _entry: &LogEntry) -> Result<(), Error> {
        Err(Error::LogUnavailable("log store is disabled".into()))
    }

    async fn query(&self, _limit: usize) -> Result<Vec<LogRecord>, Error> {
        Err(Error::LogUnavailable("log store is disabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_disabled_sink_reports_persistence_error() {
        let sink = DisabledLogSink;
        let entry = LogEntry {
            file_name: "scan.png".into(),
            extracted_text: "text".into(),
            file_size: 10,
            mime_type: None,
            processing_time_ms: 5,
        };

        let err = sink.append(&entry).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(sink.query(10).await.is_err());
    }
}
