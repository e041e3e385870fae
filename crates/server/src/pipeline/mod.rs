//! OCR request processing.
//!
//! A request moves through validate, cache lookup and then either returns
//! the cached text or runs the extractor, appends to the log sink and
//! populates the cache. Only validation and extraction failures reach the
//! caller; cache and log problems are logged and absorbed.
//!
//! The input resource is released exactly once, whichever way the request
//! ends.

pub mod result;

use std::sync::Arc;
use std::time::{Duration, Instant};

use glyph_client::{Extractor, InputSource, validate_image};
use glyph_core::cache::{CacheLookup, CachedRecord, ResultCache, compute_cache_key};
use glyph_core::sink::{LogEntry, LogSink};

pub use result::{FailureKind, ProcessingFailure, ProcessingResult};
use result::{RequestFacts, now_timestamp};

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

/// One uploaded image and the metadata the client declared for it.
#[derive(Debug)]
pub struct Submission<I> {
    pub input: I,
    /// Original file name; part of the cache key.
    pub label: String,
    pub declared_type: Option<String>,
    pub declared_size: u64,
}

/// Tunables taken from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub language: String,
    pub cache_ttl: Duration,
    pub max_upload_bytes: usize,
}

/// Request pipeline with its collaborators injected.
#[derive(Clone)]
pub struct Pipeline {
    cache: Arc<ResultCache>,
    extractor: Arc<dyn Extractor>,
    sink: Arc<dyn LogSink>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        cache: Arc<ResultCache>, extractor: Arc<dyn Extractor>, sink: Arc<dyn LogSink>, settings: PipelineSettings,
    ) -> Self {
        Self { cache, extractor, sink, settings }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }

    pub fn sink(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }

    /// Process one submission and release its input.
    pub async fn process<I: InputSource>(
        &self, submission: Submission<I>,
    ) -> Result<ProcessingResult, ProcessingFailure> {
        let Submission { input, label, declared_type, declared_size } = submission;
        let facts = RequestFacts { file_name: label, file_size: declared_size, mime_type: declared_type };

        let outcome = self.run(input.bytes(), facts).await;
        input.release().await;
        outcome
    }

    async fn run(&self, bytes: &[u8], mut facts: RequestFacts) -> Result<ProcessingResult, ProcessingFailure> {
        let started = Instant::now();

        let kind = validate_image(bytes, self.settings.max_upload_bytes).map_err(|e| {
            tracing::info!(file = %facts.file_name, error = %e, "rejected upload");
            ProcessingFailure::validation(e.to_string())
        })?;
        // An undeclared type is filled from the content on both paths.
        facts.mime_type = facts.mime_type.or_else(|| Some(kind.mime().to_string()));

        let key = compute_cache_key(bytes, &facts.file_name);
        let lookup_started = Instant::now();
        let lookup = self.cache.get(&key).await;
        let cache_check_ms = elapsed_ms(lookup_started);

        if let CacheLookup::Hit(hit) = lookup {
            tracing::info!(file = %facts.file_name, backend = %hit.backend, "served from cache");
            return Ok(ProcessingResult::from_hit(facts, hit, cache_check_ms, elapsed_ms(started)));
        }

        let ocr_started = Instant::now();
        let text = self
            .extractor
            .extract(bytes, &self.settings.language)
            .await
            .map_err(|e| {
                tracing::warn!(file = %facts.file_name, engine = self.extractor.name(), error = %e, "extraction failed");
                ProcessingFailure::extraction(e.to_string())
            })?;
        let ocr_ms = elapsed_ms(ocr_started);

        let entry = LogEntry {
            file_name: facts.file_name.clone(),
            extracted_text: text.clone(),
            file_size: facts.file_size,
            mime_type: facts.mime_type.clone(),
            processing_time_ms: ocr_ms,
        };
        if let Err(e) = self.sink.append(&entry).await {
            tracing::warn!(file = %facts.file_name, error = %e, "failed to append OCR log entry");
        }

        let record = CachedRecord {
            file_name: facts.file_name,
            extracted_text: text,
            file_size: facts.file_size,
            mime_type: facts.mime_type,
            timestamp: now_timestamp(),
            processing_time_ms: elapsed_ms(started),
            ocr_time_ms: ocr_ms,
            language: self.settings.language.clone(),
        };

        let save_started = Instant::now();
        self.cache.put(&key, &record, self.settings.cache_ttl).await;
        let cache_save_ms = elapsed_ms(save_started);

        tracing::info!(file = %record.file_name, ocr_ms, cache_save_ms, "extracted text");
        Ok(ProcessingResult::from_miss(record, cache_check_ms, cache_save_ms, elapsed_ms(started)))
    }
}
