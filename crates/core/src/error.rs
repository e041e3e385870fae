//! Unified error types for glyph.
//!
//! Messages carry a stable code prefix so they can be grepped in logs and
//! matched by API consumers.

use tokio_rusqlite::rusqlite;

/// Broad classification used to decide whether an error reaches the caller.
///
/// Only [`ErrorKind::Validation`] and [`ErrorKind::Extraction`] are ever
/// surfaced to a client; cache and persistence errors are recovered locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Extraction,
    Cache,
    Persistence,
    Internal,
}

/// Unified error types for the glyph service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input (empty upload, unknown image format, too large).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The extraction engine failed to produce text.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// The extraction engine did not finish in time.
    #[error("EXTRACT_TIMEOUT: {0}")]
    ExtractTimeout(String),

    /// Generic cache backend failure.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),

    /// Cache backend did not answer in time.
    #[error("CACHE_TIMEOUT: {0}")]
    CacheTimeout(String),

    /// Cache handle used after close.
    #[error("CACHE_CLOSED")]
    CacheClosed,

    /// Redis command or connection failure.
    #[error("CACHE_ERROR: redis: {0}")]
    Redis(#[from] redis::RedisError),

    /// Cached payload could not be encoded or decoded.
    #[error("CACHE_ERROR: serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("DB_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("DB_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Log sink is not available.
    #[error("LOG_UNAVAILABLE: {0}")]
    LogUnavailable(String),

    /// Local I/O failure (upload staging).
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error for propagation decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::Validation,
            Error::ExtractFailed(_) | Error::ExtractTimeout(_) => ErrorKind::Extraction,
            Error::Cache(_)
            | Error::CacheTimeout(_)
            | Error::CacheClosed
            | Error::Redis(_)
            | Error::Serialization(_) => ErrorKind::Cache,
            Error::Database(_) | Error::MigrationFailed(_) | Error::LogUnavailable(_) => ErrorKind::Persistence,
            Error::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
