//! Shared validation and normalization of receipt candidates.
//!
//! Both extraction paths funnel through [`normalize`] before a record is
//! returned to the caller. The step is idempotent: normalizing an already
//! normalized record changes nothing.

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::models::receipt::{ReceiptCandidate, ReceiptData, STORE_PLACEHOLDER};

/// Default confidence when the extraction service omits one.
pub const DEFAULT_CONFIDENCE: f32 = 0.7;

/// Item cap, by extraction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLimit {
    /// Structured extraction keeps up to ten items.
    Primary,
    /// The heuristic fallback keeps at most five.
    Fallback,
}

impl ItemLimit {
    pub fn cap(self) -> usize {
        match self {
            ItemLimit::Primary => 10,
            ItemLimit::Fallback => 5,
        }
    }
}

/// Validate and normalize a candidate into a [`ReceiptData`].
///
/// - empty/absent store name becomes the placeholder
/// - absent or unparseable date becomes today
/// - amounts are coerced to numbers (garbage counts as zero), clamped to
///   be non-negative, and rounded to cents
/// - items are coerced to text, truncated to the path's cap
/// - confidence is coerced and clamped into `[0, 1]`
pub fn normalize(candidate: ReceiptCandidate, limit: ItemLimit) -> ReceiptData {
    let store_name = candidate
        .store_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| STORE_PLACEHOLDER.to_string());

    let date = candidate
        .date
        .as_deref()
        .map(str::trim)
        .and_then(|raw| raw.parse::<NaiveDate>().ok())
        .unwrap_or_else(|| Utc::now().date_naive());

    let items = match candidate.items {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(item) => Some(item),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .take(limit.cap())
            .collect(),
        _ => Vec::new(),
    };

    ReceiptData {
        store_name,
        date,
        subtotal: coerce_amount(candidate.subtotal),
        taxes: coerce_amount(candidate.taxes),
        total: coerce_amount(candidate.total),
        items,
        confidence: coerce_confidence(candidate.confidence),
    }
}

/// Round to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn coerce_amount(value: Option<Value>) -> Decimal {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64().and_then(Decimal::from_f64).unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    };

    round_cents(amount.max(Decimal::ZERO))
}

fn coerce_confidence(value: Option<Value>) -> f32 {
    let confidence = match value {
        Some(Value::Number(n)) => n.as_f64().map(|v| v as f32),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0)
}
