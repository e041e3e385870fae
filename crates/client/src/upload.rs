//! Transient input resources.
//!
//! An uploaded image is spooled to `upload_dir` while a request is in flight
//! and removed when the request reaches a terminal state. [`InputSource`]
//! consumes itself on release, so the underlying resource can only be
//! released once; [`StagedUpload`] falls back to removing its file on drop if
//! release was never called.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use glyph_core::Error;

/// Transient input handed to the processing pipeline.
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Raw content of the input.
    fn bytes(&self) -> &[u8];

    /// Release the underlying resource. Best-effort: failures are logged.
    async fn release(self);
}

/// Upload spooled to disk for the duration of one request.
///
/// The file is the request-scoped resource that release removes. Nothing
/// reads it back: the extractor is fed from the in-memory copy.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    bytes: Bytes,
    released: bool,
}

impl StagedUpload {
    /// Write `bytes` to a fresh file under `dir`, creating `dir` if needed.
    pub async fn stage(dir: &Path, bytes: Bytes) -> Result<Self, Error> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.upload", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "staged upload");
        Ok(Self { path, bytes, released: false })
    }

    #[cfg(test)]
    fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl InputSource for StagedUpload {
    fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "released staged upload"),
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove staged upload"),
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("glyph-upload-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_stage_writes_file() {
        let dir = scratch_dir();
        let upload = StagedUpload::stage(&dir, Bytes::from_static(b"image")).await.unwrap();

        assert!(upload.path().starts_with(&dir));
        assert_eq!(upload.bytes(), b"image");
        assert_eq!(tokio::fs::read(upload.path()).await.unwrap(), b"image");

        upload.release().await;
        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_release_removes_file() {
        let dir = scratch_dir();
        let upload = StagedUpload::stage(&dir, Bytes::from_static(b"image")).await.unwrap();
        let path = upload.path().to_path_buf();

        upload.release().await;
        assert!(!path.exists());
        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_drop_without_release_removes_file() {
        let dir = scratch_dir();
        let upload = StagedUpload::stage(&dir, Bytes::from_static(b"image")).await.unwrap();
        let path = upload.path().to_path_buf();

        drop(upload);
        assert!(!path.exists());
        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_release_after_external_removal_does_not_panic() {
        let dir = scratch_dir();
        let upload = StagedUpload::stage(&dir, Bytes::from_static(b"image")).await.unwrap();
        tokio::fs::remove_file(upload.path()).await.unwrap();

        upload.release().await;
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
