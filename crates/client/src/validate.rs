//! Upload validation.
//!
//! Rejects empty and oversize uploads and anything whose leading bytes do not
//! match a supported raster image format. The declared content type from the
//! request is not trusted; detection goes by magic bytes only.

use glyph_core::Error;

/// Image formats the OCR engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl ImageKind {
    /// Detect the format from the leading bytes of `bytes`.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.starts_with(b"BM") && bytes.len() >= 14 {
            Some(ImageKind::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(ImageKind::Tiff)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::WebP)
        } else {
            None
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Tiff => "image/tiff",
            ImageKind::WebP => "image/webp",
        }
    }
}

/// Validate an uploaded image.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the upload is empty, larger than
/// `max_bytes`, or not a recognized image format.
pub fn validate_image(bytes: &[u8], max_bytes: usize) -> Result<ImageKind, Error> {
    if bytes.is_empty() {
        return Err(Error::InvalidInput("uploaded file is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(Error::InvalidInput(format!(
            "uploaded file is {} bytes, limit is {} bytes",
            bytes.len(),
            max_bytes
        )));
    }
    ImageKind::detect(bytes)
        .ok_or_else(|| Error::InvalidInput("unsupported or corrupted image; expected PNG, JPEG, GIF, BMP, TIFF or WebP".into()))
}
