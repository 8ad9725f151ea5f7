//! Fallback-chain orchestration: structured extraction first, heuristics
//! on any failure.

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::{ReceiptData, ScanOutcome};
use crate::normalize::{normalize, ItemLimit};
use crate::ocr::TextRecognizer;

use super::fallback::FallbackExtractor;
use super::gemini::StructuredExtractor;

/// How a receipt record was produced.
///
/// "Used fallback" is data, not a caught exception: callers branch on the
/// variant (or serialize the flag) instead of inspecting errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The structured extraction service produced the record.
    Primary(ReceiptData),

    /// The service failed somewhere and the heuristic extractor filled in.
    Degraded(ReceiptData),
}

impl Extraction {
    pub fn used_fallback(&self) -> bool {
        matches!(self, Extraction::Degraded(_))
    }

    pub fn receipt(&self) -> &ReceiptData {
        match self {
            Extraction::Primary(data) | Extraction::Degraded(data) => data,
        }
    }

    pub fn into_receipt(self) -> ReceiptData {
        match self {
            Extraction::Primary(data) | Extraction::Degraded(data) => data,
        }
    }

    /// Wrap into the transport envelope, keeping the OCR text sample.
    pub fn into_outcome(self, ocr_text: &str) -> ScanOutcome {
        let used_fallback = self.used_fallback();
        ScanOutcome::new(self.into_receipt(), used_fallback, ocr_text)
    }
}

/// Run the extraction chain over raw OCR text.
///
/// Any structured-extraction failure - unreachable service, non-success
/// status, undecodable or incomplete output - degrades to the heuristic
/// extractor; this function itself cannot fail.
pub async fn extract_receipt<S>(
    extractor: &S,
    ocr_text: &str,
    config: &ExtractionConfig,
) -> Extraction
where
    S: StructuredExtractor + ?Sized,
{
    match extractor.extract(ocr_text).await {
        Ok(candidate) => {
            debug!("structured extraction succeeded");
            Extraction::Primary(normalize(candidate, ItemLimit::Primary))
        }
        Err(error) => {
            warn!(%error, "structured extraction failed, using heuristic fallback");
            Extraction::Degraded(FallbackExtractor::from_config(config).extract(ocr_text))
        }
    }
}

/// Full scan: recognize text in the image, then run the extraction chain.
///
/// Only the OCR stage can fail here (including the no-text-detected case);
/// extraction failures never propagate.
pub async fn scan_receipt<R, S>(
    recognizer: &R,
    extractor: &S,
    image_base64: &str,
    config: &ExtractionConfig,
) -> Result<ScanOutcome>
where
    R: TextRecognizer + ?Sized,
    S: StructuredExtractor + ?Sized,
{
    let ocr_text = recognizer.recognize(image_base64).await?;
    debug!(text_len = ocr_text.len(), "OCR text recognized");

    let extraction = extract_receipt(extractor, &ocr_text, config).await;

    Ok(extraction.into_outcome(&ocr_text))
}
