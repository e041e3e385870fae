//! The value stored under a cache key.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Snapshot of a successful extraction.
///
/// Holds only what was known when the text was extracted. Retrieval context
/// (which backend served it, whether it was a hit, lookup latency) lives in
/// [`super::store::CacheHit`] and is never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRecord {
    pub file_name: String,
    pub extracted_text: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    /// RFC 3339 timestamp of the original extraction.
    pub timestamp: String,
    pub processing_time_ms: u64,
    pub ocr_time_ms: u64,
    pub language: String,
}

impl CachedRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(Error::from)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}

#[cfg(test)]
pub(crate) fn sample_record(file_name: &str, text: &str) -> CachedRecord {
    CachedRecord {
        file_name: file_name.to_string(),
        extracted_text: text.to_string(),
        file_size: 1024,
        mime_type: Some("image/png".to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
        processing_time_ms: 1200,
        ocr_time_ms: 1100,
        language: "eng".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_uses_camel_case() {
        let record = sample_record("scan.png", "hello");
        let value: serde_json::Value = serde_json::from_slice(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(value["fileName"], "scan.png");
        assert_eq!(value["extractedText"], "hello");
        assert!(value.get("fromCache").is_none());
        assert!(value.get("cacheBackend").is_none());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = CachedRecord::from_bytes(b"not json");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
