//! Receipt data models and the transport envelope.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Store name used when none could be extracted.
pub const STORE_PLACEHOLDER: &str = "Unidentified Store";

/// Number of characters of raw OCR text echoed back to the caller.
pub const TEXT_SAMPLE_CHARS: usize = 500;

/// Advisory string attached to every caller-visible failure.
pub const SCAN_FAILURE_ADVISORY: &str =
    "Receipt scanning failed. Please ensure the image is clear and contains a valid receipt.";

/// A fully validated, normalized receipt record.
///
/// Field names serialize in camelCase to match the wire format consumed by
/// clients. Monetary fields are non-negative with at most two fractional
/// digits; `confidence` is clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    /// Merchant name from the receipt header.
    pub store_name: String,

    /// Purchase date (ISO-8601 on the wire).
    pub date: NaiveDate,

    /// Amount before taxes.
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Tax amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub taxes: Decimal,

    /// Final amount charged.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Purchased item lines, in receipt order.
    pub items: Vec<String>,

    /// How much the extraction should be trusted (0.0 - 1.0).
    pub confidence: f32,
}

/// An unvalidated receipt candidate, as decoded from the extraction service
/// or assembled by the heuristic fallback.
///
/// Every field is optional and the numeric fields are raw JSON values so the
/// service can hand back numbers, numeric strings, or garbage without the
/// decode step failing; [`crate::normalize`] turns a candidate into a
/// [`ReceiptData`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReceiptCandidate {
    pub store_name: Option<String>,
    pub date: Option<String>,
    pub subtotal: Option<Value>,
    pub taxes: Option<Value>,
    pub total: Option<Value>,
    pub items: Option<Value>,
    pub confidence: Option<Value>,
}

impl From<ReceiptData> for ReceiptCandidate {
    fn from(data: ReceiptData) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        let number = |d: Decimal| Value::from(d.to_f64().unwrap_or(0.0));

        Self {
            store_name: Some(data.store_name),
            date: Some(data.date.to_string()),
            subtotal: Some(number(data.subtotal)),
            taxes: Some(number(data.taxes)),
            total: Some(number(data.total)),
            items: Some(Value::from(data.items)),
            confidence: Some(Value::from(f64::from(data.confidence))),
        }
    }
}

/// Successful scan envelope returned to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    /// The structured receipt record.
    pub receipt_data: ReceiptData,

    /// Leading sample of the raw OCR text, for caller-side debugging.
    pub extracted_text: String,

    /// Present (and true) only when the heuristic fallback produced the
    /// record; clients use it to warn the user to double-check values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl ScanOutcome {
    /// Build the envelope, truncating the OCR text to its leading sample.
    pub fn new(receipt_data: ReceiptData, used_fallback: bool, ocr_text: &str) -> Self {
        Self {
            receipt_data,
            extracted_text: ocr_text.chars().take(TEXT_SAMPLE_CHARS).collect(),
            fallback: used_fallback.then_some(true),
        }
    }
}

/// Caller-visible failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    /// Human-readable cause.
    pub error: String,

    /// Fixed advisory string.
    pub details: &'static str,
}

impl ScanFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: SCAN_FAILURE_ADVISORY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn sample_receipt() -> ReceiptData {
        ReceiptData {
            store_name: "Metro".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            subtotal: Decimal::from_str("10.00").unwrap(),
            taxes: Decimal::from_str("1.30").unwrap(),
            total: Decimal::from_str("11.30").unwrap(),
            items: vec!["Bread".to_string()],
            confidence: 0.9,
        }
    }

    #[test]
    fn receipt_serializes_camel_case_with_numeric_amounts() {
        let json = serde_json::to_value(sample_receipt()).unwrap();

        assert_eq!(json["storeName"], "Metro");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["subtotal"], 10.0);
        assert_eq!(json["taxes"], 1.3);
        assert_eq!(json["total"], 11.3);
        assert_eq!(json["confidence"].as_f64().unwrap(), 0.9f32 as f64);
    }

    #[test]
    fn outcome_omits_fallback_flag_on_primary_path() {
        let outcome = ScanOutcome::new(sample_receipt(), false, "METRO\nTOTAL 11.30");
        let json = serde_json::to_value(&outcome).unwrap();

        assert!(json.get("fallback").is_none());
        assert_eq!(json["extractedText"], "METRO\nTOTAL 11.30");
    }

    #[test]
    fn outcome_carries_fallback_flag_when_degraded() {
        let outcome = ScanOutcome::new(sample_receipt(), true, "");
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["fallback"], true);
    }

    #[test]
    fn outcome_truncates_text_sample_on_char_boundaries() {
        let text = "é".repeat(TEXT_SAMPLE_CHARS + 100);
        let outcome = ScanOutcome::new(sample_receipt(), false, &text);

        assert_eq!(outcome.extracted_text.chars().count(), TEXT_SAMPLE_CHARS);
    }

    #[test]
    fn candidate_decodes_mixed_value_types() {
        let candidate: ReceiptCandidate = serde_json::from_str(
            r#"{"storeName":"IGA","date":"2024-01-05","subtotal":"12.50","taxes":1.5,"total":14,"items":["Milk"],"confidence":0.8}"#,
        )
        .unwrap();

        assert_eq!(candidate.store_name.as_deref(), Some("IGA"));
        assert_eq!(candidate.subtotal, Some(Value::from("12.50")));
        assert_eq!(candidate.total, Some(Value::from(14)));
    }
}
