//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from, highest precedence first:
//!
//! 1. Environment variables (GLYPH_*)
//! 2. TOML config file (if GLYPH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{BackendConfig, BackendTarget};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    ///
    /// Set via GLYPH_BIND_ADDR.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Managed/remote cache, tried first (`redis://` or `rediss://`).
    ///
    /// Set via GLYPH_PRIMARY_CACHE_URL.
    #[serde(default)]
    pub primary_cache_url: Option<String>,

    /// Local cache, tried when the primary is unavailable.
    /// Accepts `redis://…` or `sqlite:<path>`.
    ///
    /// Set via GLYPH_SECONDARY_CACHE_URL.
    #[serde(default = "default_secondary_cache_url")]
    pub secondary_cache_url: Option<String>,

    /// Lifetime of cached OCR results in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Bound on connecting to and probing each cache backend at startup.
    #[serde(default = "default_cache_connect_timeout_ms")]
    pub cache_connect_timeout_ms: u64,

    /// Bound on each cache read or write while serving a request.
    #[serde(default = "default_cache_op_timeout_ms")]
    pub cache_op_timeout_ms: u64,

    /// Path to the SQLite OCR log.
    ///
    /// Set via GLYPH_LOG_DB_PATH.
    #[serde(default = "default_log_db_path")]
    pub log_db_path: PathBuf,

    /// Tesseract language code passed to the engine.
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,

    /// Bound on a single extraction.
    #[serde(default = "default_ocr_timeout_ms")]
    pub ocr_timeout_ms: u64,

    /// Tesseract page segmentation mode (`--psm`).
    #[serde(default = "default_ocr_page_seg_mode")]
    pub ocr_page_seg_mode: u8,

    /// Name or path of the tesseract executable.
    #[serde(default = "default_tesseract_bin")]
    pub tesseract_bin: String,

    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Directory uploads are spooled to while being processed.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".into()
}

fn default_secondary_cache_url() -> Option<String> {
    Some("redis://127.0.0.1:6379".into())
}

fn default_cache_ttl_secs() -> u64 {
    86_400 // 24h
}

fn default_cache_connect_timeout_ms() -> u64 {
    2_000
}

fn default_cache_op_timeout_ms() -> u64 {
    500
}

fn default_log_db_path() -> PathBuf {
    PathBuf::from("./glyph-ocr-log.sqlite")
}

fn default_ocr_language() -> String {
    "eng".into()
}

fn default_ocr_timeout_ms() -> u64 {
    60_000
}

fn default_ocr_page_seg_mode() -> u8 {
    3
}

fn default_tesseract_bin() -> String {
    "tesseract".into()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_upload_dir() -> PathBuf {
    std::env::temp_dir().join("glyph-uploads")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            primary_cache_url: None,
            secondary_cache_url: default_secondary_cache_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_connect_timeout_ms: default_cache_connect_timeout_ms(),
            cache_op_timeout_ms: default_cache_op_timeout_ms(),
            log_db_path: default_log_db_path(),
            ocr_language: default_ocr_language(),
            ocr_timeout_ms: default_ocr_timeout_ms(),
            ocr_page_seg_mode: default_ocr_page_seg_mode(),
            tesseract_bin: default_tesseract_bin(),
            max_upload_bytes: default_max_upload_bytes(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_connect_timeout_ms)
    }

    pub fn cache_op_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_op_timeout_ms)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_millis(self.ocr_timeout_ms)
    }

    /// Cache backends in priority order: primary, then secondary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a URL has an unsupported scheme.
    pub fn backend_candidates(&self) -> Result<Vec<BackendTarget>, ConfigError> {
        let mut targets = Vec::new();
        let tiers = [
            ("primary", "primary_cache_url", &self.primary_cache_url),
            ("secondary", "secondary_cache_url", &self.secondary_cache_url),
        ];

        for (label, field, url) in tiers {
            let Some(url) = url.as_deref().filter(|u| !u.trim().is_empty()) else {
                continue;
            };
            let config = BackendConfig::parse(url)
                .map_err(|e| ConfigError::Invalid { field: field.into(), reason: e.to_string() })?;
            targets.push(BackendTarget::new(label, config));
        }

        Ok(targets)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GLYPH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GLYPH_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.primary_cache_url.is_none());
        assert_eq!(config.secondary_cache_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.cache_op_timeout(), Duration::from_millis(500));
        assert!(config.cache_op_timeout() < config.ocr_timeout());
    }

    #[test]
    fn test_backend_candidates_in_priority_order() {
        let config = AppConfig {
            primary_cache_url: Some("rediss://managed.example.com:6380".into()),
            secondary_cache_url: Some("sqlite:./local-cache.sqlite".into()),
            ..Default::default()
        };

        let targets = config.backend_candidates().unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].label, "primary");
        assert!(matches!(targets[0].config, BackendConfig::Redis { .. }));
        assert_eq!(targets[1].label, "secondary");
        assert!(matches!(targets[1].config, BackendConfig::Sqlite { .. }));
    }

    #[test]
    fn test_backend_candidates_skip_unset() {
        let config = AppConfig { primary_cache_url: Some("  ".into()), secondary_cache_url: None, ..Default::default() };
        assert!(config.backend_candidates().unwrap().is_empty());
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GLYPH_PRIMARY_CACHE_URL", "redis://cache.internal:6379");
            jail.set_env("GLYPH_CACHE_TTL_SECS", "3600");
            jail.set_env("GLYPH_OCR_LANGUAGE", "deu");
            jail.set_env("GLYPH_OCR_PAGE_SEG_MODE", "6");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.primary_cache_url.as_deref(), Some("redis://cache.internal:6379"));
            assert_eq!(config.cache_ttl_secs, 3600);
            assert_eq!(config.ocr_language, "deu");
            assert_eq!(config.ocr_page_seg_mode, 6);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "glyph.toml",
                r#"
                    secondary_cache_url = "sqlite:./cache.sqlite"
                    max_upload_bytes = 2048
                "#,
            )?;
            jail.set_env("GLYPH_CONFIG_FILE", "glyph.toml");
            jail.set_env("GLYPH_MAX_UPLOAD_BYTES", "4096");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.secondary_cache_url.as_deref(), Some("sqlite:./cache.sqlite"));
            assert_eq!(config.max_upload_bytes, 4096);
            Ok(())
        });
    }
}
