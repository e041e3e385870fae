//! One-shot backend selection at startup.
//!
//! Candidates are tried in priority order. The first one that connects and
//! answers a probe within the timeout wins; the choice is never revisited
//! for the lifetime of the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::backend::{BackendCandidate, CacheBackend};

/// The backend chosen at startup.
#[derive(Clone)]
pub struct ActiveBackend {
    /// Priority label of the winning candidate.
    pub label: String,
    pub handle: Arc<dyn CacheBackend>,
}

impl ActiveBackend {
    /// Display name, e.g. `primary-redis`.
    pub fn name(&self) -> String {
        format!("{}-{}", self.label, self.handle.kind())
    }
}

impl std::fmt::Debug for ActiveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveBackend").field("name", &self.name()).finish()
    }
}

/// Try each candidate in order and return the first healthy one.
///
/// Connection and probe failures are logged and skipped. `None` means
/// caching is disabled for the process.
pub async fn select_backend(
    candidates: &[Box<dyn BackendCandidate>], connect_timeout: Duration,
) -> Option<ActiveBackend> {
    for candidate in candidates {
        let label = candidate.label();

        let handle = match timeout(connect_timeout, candidate.connect()).await {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                tracing::warn!(backend = label, error = %e, "cache backend connect failed");
                continue;
            }
            Err(_) => {
                tracing::warn!(
                    backend = label,
                    timeout_ms = connect_timeout.as_millis() as u64,
                    "cache backend connect timed out"
                );
                continue;
            }
        };

        match timeout(connect_timeout, handle.probe()).await {
            Ok(Ok(())) => {
                let active = ActiveBackend { label: label.to_string(), handle };
                tracing::info!(backend = %active.name(), "cache backend selected");
                return Some(active);
            }
            Ok(Err(e)) => {
                tracing::warn!(backend = label, error = %e, "cache backend probe failed");
            }
            Err(_) => {
                tracing::warn!(backend = label, "cache backend probe timed out");
            }
        }
        handle.close().await;
    }

    tracing::warn!("no cache backend available, caching disabled");
    None
}
