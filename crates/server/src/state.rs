//! Shared application state, assembled once at startup.

use std::path::PathBuf;
use std::sync::Arc;

use glyph_client::{Extractor, TesseractExtractor};
use glyph_core::cache::{BackendCandidate, ResultCache, select_backend};
use glyph_core::config::ConfigError;
use glyph_core::sink::{DisabledLogSink, LogSink, SqliteLogSink};
use glyph_core::{AppConfig, Database};

use crate::pipeline::{Pipeline, PipelineSettings};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Pipeline, upload_dir: PathBuf, max_upload_bytes: usize) -> Self {
        Self { pipeline, upload_dir, max_upload_bytes }
    }

    /// Connect collaborators from configuration.
    ///
    /// Never fails because a cache backend or the log store is unreachable;
    /// those degrade to a disabled cache and a disabled log sink.
    pub async fn build(config: &AppConfig) -> Result<Self, ConfigError> {
        let candidates: Vec<Box<dyn BackendCandidate>> = config
            .backend_candidates()?
            .into_iter()
            .map(|target| Box::new(target) as Box<dyn BackendCandidate>)
            .collect();
        let active = select_backend(&candidates, config.cache_connect_timeout()).await;
        let cache = Arc::new(ResultCache::new(active, config.cache_op_timeout()));

        let sink: Arc<dyn LogSink> = match Database::open(&config.log_db_path).await {
            Ok(db) => Arc::new(SqliteLogSink::new(db)),
            Err(e) => {
                tracing::warn!(path = %config.log_db_path.display(), error = %e, "log store unavailable, OCR log disabled");
                Arc::new(DisabledLogSink)
            }
        };

        let extractor = TesseractExtractor::new(config.tesseract_bin.clone(), config.ocr_timeout())
            .with_page_seg_mode(config.ocr_page_seg_mode);
        if !extractor.is_available().await {
            tracing::warn!(binary = %config.tesseract_bin, "tesseract not found, OCR requests will fail");
        }

        let settings = PipelineSettings {
            language: config.ocr_language.clone(),
            cache_ttl: config.cache_ttl(),
            max_upload_bytes: config.max_upload_bytes,
        };
        let pipeline = Pipeline::new(cache, Arc::new(extractor), sink, settings);

        Ok(Self::new(pipeline, config.upload_dir.clone(), config.max_upload_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_degrades_without_backends() {
        let dir = std::env::temp_dir().join(format!("glyph-state-test-{}", std::process::id()));
        let config = AppConfig {
            primary_cache_url: None,
            secondary_cache_url: Some("redis://127.0.0.1:1".into()),
            cache_connect_timeout_ms: 200,
            log_db_path: "/nonexistent/glyph/log.sqlite".into(),
            tesseract_bin: "glyph-no-such-binary".into(),
            upload_dir: dir.clone(),
            ..Default::default()
        };

        let state = AppState::build(&config).await.unwrap();

        assert!(!state.pipeline.cache().is_enabled());
        assert!(state.pipeline.sink().query(10).await.is_err());
        assert_eq!(state.pipeline.extractor().name(), "tesseract");
        assert_eq!(state.upload_dir, dir);
    }

    #[tokio::test]
    async fn test_build_with_sqlite_backend() {
        let config = AppConfig {
            primary_cache_url: Some("sqlite::memory:".into()),
            secondary_cache_url: None,
            log_db_path: std::env::temp_dir().join(format!("glyph-state-log-{}.sqlite", std::process::id())),
            ..Default::default()
        };

        let state = AppState::build(&config).await.unwrap();

        assert_eq!(state.pipeline.cache().status().backend.as_deref(), Some("primary-sqlite"));
        assert!(state.pipeline.sink().query(10).await.is_ok());
        let _ = std::fs::remove_file(&config.log_db_path);
    }
}
