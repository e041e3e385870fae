//! Configuration validation rules.
//!
//! Applied to `AppConfig` after it has been loaded from environment, files
//! or defaults.

use crate::config::AppConfig;
use thiserror::Error;

const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;
const MAX_UPLOAD_LIMIT: usize = 50 * 1024 * 1024;
const MAX_PAGE_SEG_MODE: u8 = 13;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_ttl_secs` is 0 or exceeds 30 days
    /// - `cache_connect_timeout_ms` is outside 100ms..=30s
    /// - `cache_op_timeout_ms` is 0 or not shorter than `ocr_timeout_ms`
    /// - `ocr_timeout_ms` is outside 1s..=10 minutes
    /// - `ocr_page_seg_mode` exceeds 13
    /// - `max_upload_bytes` is 0 or exceeds 50MB
    /// - `ocr_language`, `tesseract_bin` or `bind_addr` is empty
    /// - a cache URL has an unsupported scheme
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }
        if self.cache_ttl_secs > MAX_TTL_SECS {
            return Err(invalid("cache_ttl_secs", "must not exceed 30 days"));
        }

        if !(100..=30_000).contains(&self.cache_connect_timeout_ms) {
            return Err(invalid("cache_connect_timeout_ms", "must be between 100ms and 30000ms"));
        }

        if !(1_000..=600_000).contains(&self.ocr_timeout_ms) {
            return Err(invalid("ocr_timeout_ms", "must be between 1000ms and 600000ms"));
        }

        if self.ocr_page_seg_mode > MAX_PAGE_SEG_MODE {
            return Err(invalid("ocr_page_seg_mode", "must be between 0 and 13"));
        }

        if self.cache_op_timeout_ms == 0 {
            return Err(invalid("cache_op_timeout_ms", "must be greater than 0"));
        }
        if self.cache_op_timeout_ms >= self.ocr_timeout_ms {
            return Err(invalid("cache_op_timeout_ms", "must be shorter than ocr_timeout_ms"));
        }

        if self.max_upload_bytes == 0 {
            return Err(invalid("max_upload_bytes", "must be greater than 0"));
        }
        if self.max_upload_bytes > MAX_UPLOAD_LIMIT {
            return Err(invalid("max_upload_bytes", "must not exceed 50MB"));
        }

        if self.ocr_language.trim().is_empty() {
            return Err(invalid("ocr_language", "must not be empty"));
        }
        if self.tesseract_bin.trim().is_empty() {
            return Err(invalid("tesseract_bin", "must not be empty"));
        }
        if self.bind_addr.trim().is_empty() {
            return Err(invalid("bind_addr", "must not be empty"));
        }

        let candidates = self.backend_candidates()?;
        if candidates.is_empty() {
            tracing::warn!("no cache backends configured; OCR results will not be cached");
        }

        Ok(())
    }
}
