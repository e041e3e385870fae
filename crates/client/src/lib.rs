//! Client-side collaborators for glyph.
//!
//! This crate provides the OCR engine adapter, upload validation and the
//! transient upload staging used by the server's processing pipeline.

pub mod extract;
pub mod upload;
pub mod validate;

pub use extract::{Extractor, TesseractExtractor, normalize_text};
pub use upload::{InputSource, StagedUpload};
pub use validate::{ImageKind, validate_image};
