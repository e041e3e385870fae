//! Text extraction from images.
//!
//! ### Stable Abstraction
//! - The pipeline talks to the OCR engine only through the [`Extractor`]
//!   trait, so the engine can be swapped or faked in tests.
//!
//! ### Engines
//! - [`TesseractExtractor`] drives the `tesseract` CLI over stdin/stdout.
//!
//! ### Output Normalization
//! - Engine output is normalized (line endings, trailing whitespace, blank
//!   line runs) before it is cached or logged.

pub mod normalize;
pub mod tesseract;

pub use normalize::normalize_text;
pub use tesseract::TesseractExtractor;

use async_trait::async_trait;
use glyph_core::Error;

/// Stable extractor trait for OCR engines.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Engine identifier, e.g. `tesseract`.
    fn name(&self) -> &'static str;

    /// Whether the engine can be used at all (binary installed, service up).
    async fn is_available(&self) -> bool;

    /// Extract text from encoded image bytes.
    ///
    /// `language` is an engine-specific hint such as `eng` or `eng+deu`.
    async fn extract(&self, image: &[u8], language: &str) -> Result<String, Error>;
}
