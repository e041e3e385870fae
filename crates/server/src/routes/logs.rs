//! Recent OCR log records.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use glyph_core::sink::{LogRecord, MAX_QUERY_LIMIT};
use serde::{Deserialize, Serialize};

use crate::error::WebError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogsPage {
    count: usize,
    logs: Vec<LogRecord>,
}

pub async fn recent(
    State(state): State<AppState>, query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<LogsPage>, WebError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_QUERY_LIMIT);
    let logs = state.pipeline.sink().query(limit).await?;
    Ok(Json(LogsPage { count: logs.len(), logs }))
}
