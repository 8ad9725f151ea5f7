//! Monetary amount scanning for heuristic receipt extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT;

/// Collect every plausible monetary amount from the given lines.
///
/// Matches are parsed with currency symbols and thousands separators
/// removed; only finite values strictly greater than zero and strictly
/// below `sanity_limit` are kept. The bound rejects OCR garbage and large
/// non-price numbers such as order or card numbers.
pub fn scan_amounts<'a, I>(lines: I, sanity_limit: Decimal) -> Vec<Decimal>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut amounts = Vec::new();

    for line in lines {
        for caps in AMOUNT.captures_iter(line) {
            let integer_part: String =
                caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
            let decimal_part = caps.get(2).map(|m| m.as_str()).unwrap_or("0");

            if let Ok(amount) = Decimal::from_str(&format!("{integer_part}.{decimal_part}")) {
                if amount > Decimal::ZERO && amount < sanity_limit {
                    amounts.push(amount);
                }
            }
        }
    }

    amounts
}
