//! Text recognition provider integration.
//!
//! rcpt performs no OCR itself; an external provider turns image bytes
//! into raw text, which the extraction chain consumes.

mod vision;

use async_trait::async_trait;

use crate::error::OcrError;

pub use vision::VisionClient;

/// Trait for image-to-text recognition providers.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in a base64-encoded image.
    ///
    /// Returns [`OcrError::NoTextDetected`] when the image carries no
    /// readable text at all; the extraction stage never runs in that case.
    async fn recognize(&self, image_base64: &str) -> Result<String, OcrError>;
}
