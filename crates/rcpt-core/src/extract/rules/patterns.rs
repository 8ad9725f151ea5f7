//! Common regex patterns for heuristic receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Date patterns: day-first (DD/MM/YYYY, DD-MM-YY) and year-first
    // (YYYY-MM-DD, YYYY/MM/DD)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})\b"
    ).unwrap();

    // Monetary amount: optional currency symbol, optional thousands
    // separators, optional decimal part. Matches bare integers too; the
    // sanity bound on parsed values is what rejects non-price numbers.
    pub static ref AMOUNT: Regex = Regex::new(
        r"[$€£]?\s?(\d{1,3}(?:[,\s\u{00a0}]\d{3})+|\d+)(?:[.,](\d{1,2}))?"
    ).unwrap();

    // Markdown code fences around the extraction service's JSON output.
    // The annotated form is tried before the generic one.
    pub static ref FENCED_JSON: Regex = Regex::new(
        r"(?s)```json\n(.*?)\n```"
    ).unwrap();

    pub static ref FENCED_BLOCK: Regex = Regex::new(
        r"(?s)```\n(.*?)\n```"
    ).unwrap();
}

/// Tokens that disqualify a line from being a purchased-item candidate
/// (summary and metadata lines, in the languages receipts commonly use
/// around here). Compared case-insensitively.
pub const ITEM_EXCLUDE_TOKENS: &[&str] = &[
    "total",
    "subtotal",
    "sous-total",
    "tax",
    "taxe",
    "tps",
    "tvq",
    "date",
];
