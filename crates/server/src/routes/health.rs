//! Banner, health and cache statistics endpoints.

use axum::Json;
use axum::extract::State;
use glyph_core::cache::{BackendStatus, CacheStatsSnapshot};
use serde::Serialize;

use crate::pipeline::result::now_timestamp;
use crate::state::AppState;

const SERVICE_NAME: &str = "glyph-ocr";

#[derive(Debug, Serialize)]
pub struct Banner {
    name: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
}

pub async fn banner() -> Json<Banner> {
    Json(Banner {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ["GET /", "GET /health", "POST /ocr", "GET /logs", "GET /cache/stats"],
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    status: &'static str,
    version: &'static str,
    timestamp: String,
    extractor: &'static str,
    cache: BackendStatus,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now_timestamp(),
        extractor: state.pipeline.extractor().name(),
        cache: state.pipeline.cache().status(),
    })
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    backend: BackendStatus,
    stats: CacheStatsSnapshot,
}

pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    let cache = state.pipeline.cache();
    Json(CacheStats { backend: cache.status(), stats: cache.stats() })
}
