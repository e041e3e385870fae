//! Pluggable cache backend abstraction.
//!
//! A [`BackendCandidate`] knows how to connect; the resulting
//! [`CacheBackend`] handle serves raw byte reads and writes. Backends report
//! every failure as an [`Error`]; turning those into misses and no-ops is the
//! job of [`super::store::ResultCache`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::redis::RedisBackend;
use super::sqlite::SqliteBackend;
use crate::Error;

/// Live connection to a cache store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend type name, e.g. `redis`.
    fn kind(&self) -> &'static str;

    /// Liveness check, the equivalent of `PING`.
    async fn probe(&self) -> Result<(), Error>;

    /// Read a value. `Ok(None)` means absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Write a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), Error>;

    /// Release the connection. Later calls fail with [`Error::CacheClosed`].
    async fn close(&self);
}

/// Something the backend selector can try to connect to.
#[async_trait]
pub trait BackendCandidate: Send + Sync {
    /// Priority label such as `primary` or `secondary`.
    fn label(&self) -> &str;

    async fn connect(&self) -> Result<Arc<dyn CacheBackend>, Error>;
}

/// Connection settings for one backend, parsed from a URL.
///
/// `redis://` and `rediss://` select Redis; `sqlite:<path>` selects a local
/// SQLite file, with `sqlite::memory:` for an in-process store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Redis { url: String },
    Sqlite { path: Option<PathBuf> },
}

impl BackendConfig {
    pub fn parse(url: &str) -> Result<Self, Error> {
        let url = url.trim();
        if url.starts_with("redis://") || url.starts_with("rediss://") {
            return Ok(Self::Redis { url: url.to_string() });
        }
        if let Some(rest) = url.strip_prefix("sqlite:") {
            if rest == ":memory:" {
                return Ok(Self::Sqlite { path: None });
            }
            if rest.is_empty() {
                return Err(Error::InvalidInput("sqlite backend needs a path".into()));
            }
            return Ok(Self::Sqlite { path: Some(PathBuf::from(rest)) });
        }
        Err(Error::InvalidInput(format!("unsupported cache backend url: {url}")))
    }
}

/// A labelled backend config, as produced from application configuration.
#[derive(Debug, Clone)]
pub struct BackendTarget {
    pub label: String,
    pub config: BackendConfig,
}

impl BackendTarget {
    pub fn new(label: impl Into<String>, config: BackendConfig) -> Self {
        Self { label: label.into(), config }
    }
}

#[async_trait]
impl BackendCandidate for BackendTarget {
    fn label(&self) -> &str {
        &self.label
    }

    async fn connect(&self) -> Result<Arc<dyn CacheBackend>, Error> {
        match &self.config {
            BackendConfig::Redis { url } => Ok(Arc::new(RedisBackend::connect(url).await?)),
            BackendConfig::Sqlite { path: Some(path) } => Ok(Arc::new(SqliteBackend::open(path).await?)),
            BackendConfig::Sqlite { path: None } => Ok(Arc::new(SqliteBackend::open_in_memory().await?)),
        }
    }
}
