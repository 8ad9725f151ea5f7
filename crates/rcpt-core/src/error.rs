//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
///
/// Only configuration problems and a failed OCR stage ever reach the caller;
/// structured-extraction failures are absorbed by the heuristic fallback and
/// never surface here.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Text recognition (OCR) error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Structured extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the text recognition provider.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The HTTP request to the provider failed.
    #[error("text recognition request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("text recognition service returned status {0}")]
    Status(u16),

    /// The provider response did not have the expected shape.
    #[error("malformed text recognition response: {0}")]
    MalformedResponse(String),

    /// The image contains no recognizable text.
    #[error("no text detected in the image")]
    NoTextDetected,
}

/// Errors related to the structured extraction stage.
///
/// Every variant is recoverable: the pipeline answers any of these by
/// switching to the heuristic fallback extractor.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The HTTP request to the extraction service failed.
    #[error("structured extraction request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The extraction service answered with a non-success status.
    #[error("structured extraction service returned status {0}")]
    ServiceUnavailable(u16),

    /// The response carries no candidate content to decode.
    #[error("response carries no structured output")]
    MissingStructuredOutput,

    /// The response text is not valid JSON, even after fence stripping.
    #[error("structured output is not valid JSON: {0}")]
    MalformedStructuredOutput(#[from] serde_json::Error),

    /// A required field is absent from the decoded output.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
