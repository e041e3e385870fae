//! Content-addressed cache key generation.

use std::fmt;

use sha2::{Digest, Sha256};

/// Namespace prefix shared by every OCR result key.
pub const KEY_PREFIX: &str = "ocr:";

/// Deterministic key for one (content, label) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex-encoded SHA-256 of the raw content bytes.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Compute the cache key for uploaded content and its label (file name).
///
/// The content digest goes in first and the label second. The digest has a
/// fixed width, so no (content, label) split can collide with another.
pub fn compute_cache_key(content: &[u8], label: &str) -> CacheKey {
    let digest = Sha256::digest(content);
    let mut hasher = Sha256::new();
    hasher.update(digest);
    hasher.update(label.as_bytes());
    CacheKey(format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let key1 = compute_cache_key(b"\x89PNG image", "scan.png");
        let key2 = compute_cache_key(b"\x89PNG image", "scan.png");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_hash_known_value() {
        // Pinned so a change in derivation is caught; keys must survive restarts.
        let key = compute_cache_key(b"", "");
        let inner = hex::encode(Sha256::digest(Sha256::digest(b"")));
        assert_eq!(key.as_str(), format!("ocr:{inner}"));
    }

    #[test]
    fn test_hash_different_label() {
        let a = compute_cache_key(b"same bytes", "a.png");
        let b = compute_cache_key(b"same bytes", "b.png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_different_content() {
        let a = compute_cache_key(b"first", "scan.png");
        let b = compute_cache_key(b"second", "scan.png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_boundary_shift() {
        let a = compute_cache_key(b"ab", "c");
        let b = compute_cache_key(b"a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_format() {
        let key = compute_cache_key(b"content", "label");
        let hex_part = key.as_str().strip_prefix(KEY_PREFIX).unwrap();
        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
