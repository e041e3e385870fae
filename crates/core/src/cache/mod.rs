//! Content-addressed OCR result cache with backend failover.
//!
//! - Keys are SHA-256 digests of (image bytes, file name)
//! - Backends (Redis, SQLite) are tried in priority order once at startup
//! - Every cache failure degrades to a miss; nothing here fails a request

pub mod backend;
pub mod hash;
pub mod record;
pub mod redis;
pub mod selector;
pub mod sqlite;
pub mod store;

pub use backend::{BackendCandidate, BackendConfig, BackendTarget, CacheBackend};
pub use hash::{CacheKey, compute_cache_key, content_hash};
pub use record::CachedRecord;
pub use self::redis::RedisBackend;
pub use selector::{ActiveBackend, select_backend};
pub use sqlite::SqliteBackend;
pub use store::{BackendStatus, CacheHit, CacheLookup, CacheStatsSnapshot, DEFAULT_OP_TIMEOUT, DEFAULT_TTL, ResultCache};
