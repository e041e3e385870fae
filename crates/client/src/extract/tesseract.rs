//! Tesseract CLI engine.
//!
//! Runs `tesseract stdin stdout -l <lang> --psm <mode>`, feeding the image
//! over stdin. The child is killed if the extraction times out or the
//! request is dropped.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use glyph_core::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Extractor, normalize_text};

/// Fully automatic page segmentation without orientation detection.
pub const DEFAULT_PAGE_SEG_MODE: u8 = 3;

#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    binary: String,
    timeout: Duration,
    page_seg_mode: u8,
}

impl TesseractExtractor {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self { binary: binary.into(), timeout, page_seg_mode: DEFAULT_PAGE_SEG_MODE }
    }

    pub fn with_page_seg_mode(mut self, mode: u8) -> Self {
        self.page_seg_mode = mode;
        self
    }
}

#[async_trait]
impl Extractor for TesseractExtractor {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn extract(&self, image: &[u8], language: &str) -> Result<String, Error> {
        if image.is_empty() {
            return Err(Error::ExtractFailed("no image data".into()));
        }

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::ExtractFailed(format!("failed to run {}: {}", self.binary, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::ExtractFailed("tesseract stdin unavailable".into()))?;
        let input = image.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| Error::ExtractFailed(format!("tesseract did not complete: {}", e)))?,
            Err(_) => {
                return Err(Error::ExtractTimeout(format!(
                    "tesseract exceeded {}ms",
                    self.timeout.as_millis()
                )));
            }
        };

        if let Ok(Err(e)) = writer.await {
            tracing::debug!(error = %e, "tesseract closed stdin early");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExtractFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = normalize_text(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(bytes = image.len(), chars = text.len(), language, "tesseract extraction complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let extractor = TesseractExtractor::new("glyph-no-such-binary", Duration::from_secs(5));
        assert!(!extractor.is_available().await);
    }

    #[tokio::test]
    async fn test_missing_binary_fails_extraction() {
        let extractor = TesseractExtractor::new("glyph-no-such-binary", Duration::from_secs(5));
        let err = extractor.extract(b"\x89PNG\r\n\x1a\n", "eng").await.unwrap_err();
        assert!(matches!(err, Error::ExtractFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_image_fails() {
        let extractor = TesseractExtractor::new("tesseract", Duration::from_secs(5));
        assert!(matches!(extractor.extract(b"", "eng").await, Err(Error::ExtractFailed(_))));
    }

    #[cfg(unix)]
    mod scripted {
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;

        use super::*;

        /// Write an executable shell script standing in for tesseract.
        fn script(body: &str) -> PathBuf {
            let path = std::env::temp_dir().join(format!("glyph-fake-tesseract-{}", uuid::Uuid::new_v4()));
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_output_is_normalized() {
            let path = script("cat >/dev/null\nprintf 'Hello  \\r\\n\\n\\n\\nWorld\\n\\f'");
            let extractor = TesseractExtractor::new(path.to_string_lossy(), Duration::from_secs(5));

            let text = extractor.extract(b"image bytes", "eng").await.unwrap();
            assert_eq!(text, "Hello\n\nWorld");
            let _ = std::fs::remove_file(path);
        }

        #[tokio::test]
        async fn test_page_seg_mode_is_passed() {
            let path = script("cat >/dev/null\necho \"$@\"");
            let extractor =
                TesseractExtractor::new(path.to_string_lossy(), Duration::from_secs(5)).with_page_seg_mode(6);

            let args = extractor.extract(b"image bytes", "deu").await.unwrap();
            assert_eq!(args, "stdin stdout -l deu --psm 6");
            let _ = std::fs::remove_file(path);
        }

        #[tokio::test]
        async fn test_nonzero_exit_is_extract_failure() {
            let path = script("cat >/dev/null\necho 'Error in pixReadStream' >&2\nexit 1");
            let extractor = TesseractExtractor::new(path.to_string_lossy(), Duration::from_secs(5));

            let err = extractor.extract(b"garbage", "eng").await.unwrap_err();
            assert!(err.to_string().contains("pixReadStream"));
            let _ = std::fs::remove_file(path);
        }

        #[tokio::test]
        async fn test_slow_engine_times_out() {
            let path = script("sleep 5");
            let extractor = TesseractExtractor::new(path.to_string_lossy(), Duration::from_millis(200));

            let err = extractor.extract(b"image bytes", "eng").await.unwrap_err();
            assert!(matches!(err, Error::ExtractTimeout(_)));
            let _ = std::fs::remove_file(path);
        }
    }
}
