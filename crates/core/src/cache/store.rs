//! Best-effort result cache.
//!
//! [`ResultCache`] wraps whichever backend the selector picked at startup
//! and converts every backend failure into a miss or a no-op. None of its
//! methods return an error: a broken cache looks exactly like a cold one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::time::timeout;

use super::hash::CacheKey;
use super::record::CachedRecord;
use super::selector::ActiveBackend;
use crate::Error;

/// Default lifetime of a cached record.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default bound on a single cache read or write.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(500);

/// A record served from the cache, with its retrieval context.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub record: CachedRecord,
    pub backend: String,
    pub lookup_ms: u64,
}

/// Outcome of a cache read.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Hit(CacheHit),
    Miss,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

/// Read-only view of the backend state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStatus {
    pub enabled: bool,
    pub backend: Option<String>,
    pub tier: Option<String>,
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub stores: u64,
    pub store_errors: u64,
}

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    stores: AtomicU64,
    store_errors: AtomicU64,
}

impl CacheStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// Result cache over the backend selected at startup.
///
/// Shared across requests behind an `Arc`. The backend is fixed at
/// construction; [`ResultCache::shutdown`] is the only state change.
#[derive(Debug)]
pub struct ResultCache {
    active: Option<ActiveBackend>,
    op_timeout: Duration,
    shut_down: AtomicBool,
    stats: CacheStats,
}

impl ResultCache {
    pub fn new(active: Option<ActiveBackend>, op_timeout: Duration) -> Self {
        Self { active, op_timeout, shut_down: AtomicBool::new(false), stats: CacheStats::default() }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_OP_TIMEOUT)
    }

    fn backend(&self) -> Option<&ActiveBackend> {
        if self.shut_down.load(Ordering::Acquire) {
            return None;
        }
        self.active.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.backend().is_some()
    }

    pub fn status(&self) -> BackendStatus {
        match self.backend() {
            Some(active) => {
                BackendStatus { enabled: true, backend: Some(active.name()), tier: Some(active.label.clone()) }
            }
            None => BackendStatus { enabled: false, backend: None, tier: None },
        }
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Run one backend call under `op_timeout`.
    async fn bounded<T>(&self, op: &str, call: impl Future<Output = Result<T, Error>>) -> Result<T, Error> {
        match timeout(self.op_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::CacheTimeout(format!("{op} exceeded {}ms", self.op_timeout.as_millis()))),
        }
    }

    /// Look up a record. Any failure is logged and reported as a miss.
    pub async fn get(&self, key: &CacheKey) -> CacheLookup {
        let Some(active) = self.backend() else {
            return CacheLookup::Miss;
        };

        let started = Instant::now();
        let outcome = self.bounded("get", active.handle.get(key.as_str())).await;
        let lookup_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Some(bytes)) => match CachedRecord::from_bytes(&bytes) {
                Ok(record) => {
                    CacheStats::bump(&self.stats.hits);
                    tracing::debug!(key = %key, backend = %active.name(), lookup_ms, "cache hit");
                    CacheLookup::Hit(CacheHit { record, backend: active.name(), lookup_ms })
                }
                Err(e) => {
                    CacheStats::bump(&self.stats.errors);
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                    CacheLookup::Miss
                }
            },
            Ok(None) => {
                CacheStats::bump(&self.stats.misses);
                tracing::debug!(key = %key, lookup_ms, "cache miss");
                CacheLookup::Miss
            }
            Err(e) => {
                CacheStats::bump(&self.stats.errors);
                tracing::warn!(key = %key, backend = %active.name(), lookup_ms, error = %e, "cache read failed");
                CacheLookup::Miss
            }
        }
    }

    /// Store a record with the given lifetime. Failures are logged only.
    pub async fn put(&self, key: &CacheKey, record: &CachedRecord, ttl: Duration) {
        let Some(active) = self.backend() else {
            return;
        };

        let bytes = match record.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                CacheStats::bump(&self.stats.store_errors);
                tracing::warn!(key = %key, error = %e, "failed to encode cache record");
                return;
            }
        };

        match self.bounded("set", active.handle.set(key.as_str(), &bytes, ttl)).await {
            Ok(()) => {
                CacheStats::bump(&self.stats.stores);
                tracing::debug!(key = %key, backend = %active.name(), ttl_secs = ttl.as_secs(), "cached result");
            }
            Err(e) => {
                CacheStats::bump(&self.stats.store_errors);
                tracing::warn!(key = %key, backend = %active.name(), error = %e, "cache write failed");
            }
        }
    }

    /// Close the backend. Calls made afterwards are misses and no-ops.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(active) = &self.active {
            tracing::info!(backend = %active.name(), "closing cache backend");
            active.handle.close().await;
        }
    }
}
