//! Receipt extraction: primary structured path, heuristic fallback, and
//! the chain that ties them together.

pub mod fallback;
pub mod gemini;
mod pipeline;
pub mod rules;

pub use fallback::{FallbackExtractor, FALLBACK_CONFIDENCE};
pub use gemini::{GeminiExtractor, StructuredExtractor};
pub use pipeline::{extract_receipt, scan_receipt, Extraction};
