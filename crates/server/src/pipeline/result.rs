//! Response types produced by the processing pipeline.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use glyph_core::CachedRecord;
use glyph_core::cache::CacheHit;
use serde::Serialize;

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Successful OCR response.
///
/// Cache annotations are only present on a hit. None of these fields are
/// ever written back into the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub success: bool,
    pub file_name: String,
    pub extracted_text: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    pub timestamp: String,
    /// End-to-end time for this request.
    pub processing_time_ms: u64,
    /// Time spent in the OCR engine; zero on a hit.
    pub ocr_time_ms: u64,
    pub cache_check_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_save_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_lookup_ms: Option<u64>,
    /// Total time of the request that originally produced the cached text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_processing_time_ms: Option<u64>,
}

/// Request-specific fields that are never taken from the cache.
#[derive(Debug, Clone)]
pub(crate) struct RequestFacts {
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
}

impl ProcessingResult {
    pub(crate) fn from_hit(
        facts: RequestFacts, hit: CacheHit, cache_check_time_ms: u64, processing_time_ms: u64,
    ) -> Self {
        Self {
            success: true,
            file_name: facts.file_name,
            extracted_text: hit.record.extracted_text,
            file_size: facts.file_size,
            mime_type: facts.mime_type,
            timestamp: now_timestamp(),
            processing_time_ms,
            ocr_time_ms: 0,
            cache_check_time_ms,
            cache_save_time_ms: None,
            from_cache: Some(true),
            cache_hit: Some(true),
            cache_backend: Some(hit.backend),
            cache_lookup_ms: Some(hit.lookup_ms),
            original_processing_time_ms: Some(hit.record.processing_time_ms),
        }
    }

    pub(crate) fn from_miss(
        record: CachedRecord, cache_check_time_ms: u64, cache_save_time_ms: u64, processing_time_ms: u64,
    ) -> Self {
        Self {
            success: true,
            file_name: record.file_name,
            extracted_text: record.extracted_text,
            file_size: record.file_size,
            mime_type: record.mime_type,
            timestamp: record.timestamp,
            processing_time_ms,
            ocr_time_ms: record.ocr_time_ms,
            cache_check_time_ms,
            cache_save_time_ms: Some(cache_save_time_ms),
            from_cache: None,
            cache_hit: None,
            cache_backend: None,
            cache_lookup_ms: None,
            original_processing_time_ms: None,
        }
    }
}

/// User-visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Validation,
    Extraction,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Extraction => "extraction",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            FailureKind::Validation => StatusCode::BAD_REQUEST,
            FailureKind::Extraction => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A request that ended in the errored state.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct ProcessingFailure {
    pub kind: FailureKind,
    pub message: String,
    pub timestamp: String,
}

impl ProcessingFailure {
    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::Validation, message: message.into(), timestamp: now_timestamp() }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::Extraction, message: message.into(), timestamp: now_timestamp() }
    }
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: FailureDetail<'a>,
    timestamp: &'a str,
}

#[derive(Serialize)]
struct FailureDetail<'a> {
    kind: &'a str,
    message: &'a str,
}

/// Error envelope shared by every failing endpoint.
pub(crate) fn failure_response(status: StatusCode, kind: &str, message: &str, timestamp: &str) -> Response {
    let body = FailureBody { success: false, error: FailureDetail { kind, message }, timestamp };
    (status, Json(body)).into_response()
}

impl IntoResponse for ProcessingFailure {
    fn into_response(self) -> Response {
        failure_response(self.kind.status(), self.kind.as_str(), &self.message, &self.timestamp)
    }
}
