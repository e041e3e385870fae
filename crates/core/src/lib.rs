//! Core types and shared functionality for glyph.
//!
//! This crate provides:
//! - Content-addressed OCR result cache with Redis/SQLite backend failover
//! - OCR log sink backed by SQLite
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod sink;

pub use cache::{CacheKey, CachedRecord, ResultCache};
pub use config::AppConfig;
pub use db::Database;
pub use error::{Error, ErrorKind};
