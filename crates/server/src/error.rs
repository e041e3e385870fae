//! HTTP-facing errors for the glyph server.
//!
//! Every failure is rendered with the same envelope as a pipeline failure:
//! `{ success: false, error: { kind, message }, timestamp }`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use glyph_core::ErrorKind;

use crate::pipeline::ProcessingFailure;
use crate::pipeline::result::{failure_response, now_timestamp};

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Validation or extraction failure from the pipeline.
    #[error(transparent)]
    Processing(#[from] ProcessingFailure),

    /// Malformed or oversized multipart body.
    #[error("INVALID_UPLOAD: {0}")]
    Upload(#[from] MultipartError),

    /// Query string that does not match the endpoint's parameters.
    #[error("INVALID_QUERY: {0}")]
    Query(#[from] QueryRejection),

    /// A non-critical dependency (such as the log store) is not available.
    #[error("UNAVAILABLE: {0}")]
    Unavailable(String),

    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<glyph_core::Error> for WebError {
    fn from(err: glyph_core::Error) -> Self {
        match err.kind() {
            ErrorKind::Persistence => WebError::Unavailable(err.to_string()),
            _ => WebError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            WebError::Processing(failure) => return failure.into_response(),
            WebError::Upload(e) => (e.status(), "validation", e.body_text()),
            WebError::Query(e) => (e.status(), "validation", e.body_text()),
            WebError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            WebError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };
        failure_response(status, kind, &message, &now_timestamp())
    }
}
