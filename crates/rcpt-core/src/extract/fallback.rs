//! Heuristic receipt extraction from raw OCR text.
//!
//! This is the availability backstop of the pipeline: it runs entirely
//! locally, always succeeds, and tags its output with a low confidence so
//! downstream consumers know to double-check the values. Worst case (empty
//! input) it yields zeroed amounts, the store placeholder, and today's
//! date.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::{ReceiptCandidate, ReceiptData};
use crate::normalize::{normalize, round_cents, ItemLimit};

use super::rules::patterns::ITEM_EXCLUDE_TOKENS;
use super::rules::{scan_amounts, scan_receipt_date};

/// Confidence assigned to every heuristic extraction.
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Store names are cut at this many characters.
const STORE_NAME_MAX_CHARS: usize = 50;

/// Lines considered as item candidates (after the store-name line).
const ITEM_SCAN_WINDOW: usize = 9;

/// Item candidates shorter than or equal to this are discarded.
const ITEM_MIN_CHARS: usize = 3;

/// Item candidates longer than or equal to this are discarded.
const ITEM_MAX_CHARS: usize = 50;

/// Line-based heuristic extractor.
#[derive(Debug, Clone)]
pub struct FallbackExtractor {
    /// Assumed blended tax rate used to split the total.
    tax_rate: Decimal,
    /// Exclusive upper bound on accepted amounts.
    sanity_limit: Decimal,
}

impl FallbackExtractor {
    /// Create an extractor with the default tax-rate and amount bounds.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            tax_rate: config.fallback_tax_rate,
            sanity_limit: config.amount_sanity_limit,
        }
    }

    /// Derive a best-effort receipt record from raw OCR text.
    ///
    /// Never fails: every step degrades to a documented default.
    pub fn extract(&self, text: &str) -> ReceiptData {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let store_name = lines
            .first()
            .map(|line| line.chars().take(STORE_NAME_MAX_CHARS).collect::<String>());

        let date = scan_receipt_date(lines.iter().copied());

        let amounts = scan_amounts(lines.iter().copied(), self.sanity_limit);
        // The grand total is typically the largest figure printed on a
        // receipt.
        let total = amounts.iter().copied().max().unwrap_or(Decimal::ZERO);
        let subtotal = if total > Decimal::ZERO {
            round_cents(total * (Decimal::ONE - self.tax_rate))
        } else {
            Decimal::ZERO
        };
        let taxes = total - subtotal;

        let items: Vec<&str> = lines
            .iter()
            .skip(1)
            .take(ITEM_SCAN_WINDOW)
            .filter(|line| {
                let chars = line.chars().count();
                chars > ITEM_MIN_CHARS && chars < ITEM_MAX_CHARS
            })
            .filter(|line| {
                let lowered = line.to_lowercase();
                !ITEM_EXCLUDE_TOKENS
                    .iter()
                    .any(|token| lowered.contains(token))
            })
            .take(ItemLimit::Fallback.cap())
            .copied()
            .collect();

        debug!(
            lines = lines.len(),
            amounts = amounts.len(),
            items = items.len(),
            date_found = date.is_some(),
            "heuristic extraction"
        );

        let candidate = ReceiptCandidate {
            store_name,
            date: date.map(|d| d.to_string()),
            subtotal: Some(json!(subtotal)),
            taxes: Some(json!(taxes)),
            total: Some(json!(total)),
            items: Some(json!(items)),
            confidence: Some(json!(FALLBACK_CONFIDENCE)),
        };

        normalize(candidate, ItemLimit::Fallback)
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}
