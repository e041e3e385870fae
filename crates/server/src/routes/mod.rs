//! HTTP routes.
//!
//! - `GET /` service banner
//! - `GET /health` liveness plus cache backend status
//! - `POST /ocr` multipart upload, field `image`
//! - `GET /logs` recent OCR log records
//! - `GET /cache/stats` cache counters

mod health;
mod logs;
mod ocr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Headroom for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health))
        .route("/ocr", post(ocr::ocr))
        .route("/logs", get(logs::recent))
        .route("/cache/stats", get(health::cache_stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use glyph_client::Extractor;
    use glyph_core::cache::{ActiveBackend, DEFAULT_OP_TIMEOUT, DEFAULT_TTL, ResultCache, SqliteBackend};
    use glyph_core::sink::{LogSink, SqliteLogSink};
    use glyph_core::{Database, Error};

    use crate::pipeline::{Pipeline, PipelineSettings};
    use crate::state::AppState;

    pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x10";

    pub struct StaticExtractor(pub &'static str);

    #[async_trait]
    impl Extractor for StaticExtractor {
        fn name(&self) -> &'static str {
            "static"
        }
        async fn is_available(&self) -> bool {
            true
        }
        async fn extract(&self, _image: &[u8], _language: &str) -> Result<String, Error> {
            Ok(self.0.to_string())
        }
    }

    pub async fn state_with_sink(sink: Arc<dyn LogSink>) -> AppState {
        let handle = Arc::new(SqliteBackend::open_in_memory().await.unwrap());
        let cache = Arc::new(ResultCache::new(Some(ActiveBackend { label: "primary".into(), handle }), DEFAULT_OP_TIMEOUT));
        let settings = PipelineSettings { language: "eng".into(), cache_ttl: DEFAULT_TTL, max_upload_bytes: 4096 };
        let pipeline = Pipeline::new(cache, Arc::new(StaticExtractor("Hello glyph")), sink, settings);
        let upload_dir = std::env::temp_dir().join(format!("glyph-routes-test-{}", unique_suffix()));
        AppState::new(pipeline, upload_dir, 4096)
    }

    pub async fn test_state() -> AppState {
        let db = Database::open_in_memory().await.unwrap();
        state_with_sink(Arc::new(SqliteLogSink::new(db))).await
    }

    fn unique_suffix() -> String {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        format!("{}-{}", std::process::id(), COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Build a `multipart/form-data` request with a single file part.
    pub fn multipart_request(field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "glyph-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/ocr")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
