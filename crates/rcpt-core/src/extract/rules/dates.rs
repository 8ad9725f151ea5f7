//! Date scanning for heuristic receipt extraction.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_YMD};

/// Scan lines in order and resolve the receipt date from the first line
/// that contains a date-shaped substring.
///
/// The first such line settles the scan: when its match fails to parse as
/// a calendar date, `None` is returned and later lines are never consulted,
/// even if one of them carries a valid date. This mirrors the behavior of
/// the system this extractor replaces and is kept deliberately.
pub fn scan_receipt_date<'a, I>(lines: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a str>,
{
    for line in lines {
        if let Some(caps) = DATE_DMY.captures(line) {
            return parse_day_first(&caps[1], &caps[2], &caps[3]);
        }
        if let Some(caps) = DATE_YMD.captures(line) {
            return parse_year_first(&caps[1], &caps[2], &caps[3]);
        }
    }

    None
}

/// Parse a `D[/-]D[/-]Y` match, trying day-month order first and falling
/// back to month-day order when the former is not a valid calendar date.
fn parse_day_first(a: &str, b: &str, year: &str) -> Option<NaiveDate> {
    let a: u32 = a.parse().ok()?;
    let b: u32 = b.parse().ok()?;
    let year = parse_year(year);

    NaiveDate::from_ymd_opt(year, b, a).or_else(|| NaiveDate::from_ymd_opt(year, a, b))
}

fn parse_year_first(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scans_day_first_date() {
        let date = scan_receipt_date(["METRO", "15/03/2024"]);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn scans_year_first_date() {
        let date = scan_receipt_date(["Date: 2024-01-05"]);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn month_day_order_recovers_us_style_dates() {
        let date = scan_receipt_date(["03/15/2024"]);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn two_digit_year_maps_to_current_century() {
        let date = scan_receipt_date(["15-03-24"]);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn first_date_shaped_line_settles_the_scan() {
        // 99/99/2024 is date-shaped but not a calendar date; the valid date
        // on the next line must not be consulted.
        let date = scan_receipt_date(["99/99/2024", "15/03/2024"]);
        assert_eq!(date, None);
    }

    #[test]
    fn no_date_shaped_line_yields_none() {
        let date = scan_receipt_date(["METRO", "TOTAL 12.00"]);
        assert_eq!(date, None);
    }
}
