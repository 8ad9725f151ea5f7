//! Core library for receipt scanning.
//!
//! This crate provides:
//! - Receipt data models and the caller-facing envelope
//! - Text recognition provider client (external OCR)
//! - Primary structured extraction via a language-understanding service
//! - Heuristic fallback extraction that works without any network
//! - Shared validation/normalization applied to both paths

pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod ocr;

pub use error::{ExtractionError, OcrError, RcptError, Result};
pub use extract::{
    extract_receipt, scan_receipt, Extraction, FallbackExtractor, GeminiExtractor,
    StructuredExtractor, FALLBACK_CONFIDENCE,
};
pub use models::config::{google_api_key, RcptConfig, API_KEY_VAR};
pub use models::receipt::{
    ReceiptCandidate, ReceiptData, ScanFailure, ScanOutcome, SCAN_FAILURE_ADVISORY,
    STORE_PLACEHOLDER,
};
pub use normalize::{normalize, ItemLimit};
pub use ocr::{TextRecognizer, VisionClient};
