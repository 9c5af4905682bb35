//! Value normalisation shared by every predicate.
//!
//! Contract exports carry numbers with thousands separators and currency
//! marks, dates in several layouts, and textual null markers left behind by
//! upstream spreadsheet tools. Everything here is total: malformed input
//! yields `None` (absent) rather than an error.

use chrono::{NaiveDate, NaiveDateTime};

use feed_model::{IdentityMode, IdentityRule};

/// Text that upstream exports use in place of an empty cell.
const MISSING_MARKERS: &[&str] = &["nan", "NaN", "NAN", "None", "NULL", "null", "<NA>", "NaT"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y.%m.%d", "%Y年%m月%d日"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

/// True for blank cells and textual null markers.
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

/// Parses an amount, ignoring thousands separators, yen marks and spaces.
pub fn parse_amount(value: &str) -> Option<f64> {
    if is_missing(value) {
        return None;
    }
    let cleaned: String = value
        .chars()
        .filter(|ch| !matches!(ch, ',' | '，' | '¥' | '￥' | '円') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

/// Parses a calendar date; a time-of-day component is discarded.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if is_missing(value) {
        return None;
    }
    let trimmed = value.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// Formats an amount as an integer when it has no fractional part.
pub fn amount_label(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{amount}")
    }
}

pub fn amount_in(amount: f64, set: &[f64]) -> bool {
    set.iter().any(|candidate| *candidate == amount)
}

/// Applies an identity rule to one cell. `None` means the cell is absent.
pub fn matches_identity(rule: &IdentityRule, value: Option<&str>) -> bool {
    let raw = value.unwrap_or_default();
    match rule.mode {
        IdentityMode::Numeric => match parse_amount(raw) {
            Some(number) => rule
                .allowed
                .iter()
                .filter_map(|allowed| parse_amount(allowed))
                .any(|allowed| allowed == number),
            None => false,
        },
        IdentityMode::String => {
            let trimmed = if is_missing(raw) { "" } else { raw.trim() };
            rule.allowed.contains(trimmed)
        }
        IdentityMode::Mixed => {
            if is_missing(raw) {
                return true;
            }
            let trimmed = raw.trim();
            if rule.allowed.contains(trimmed) {
                return true;
            }
            match parse_amount(trimmed) {
                Some(number) => rule
                    .allowed
                    .iter()
                    .filter_map(|allowed| parse_amount(allowed))
                    .any(|allowed| allowed == number),
                None => false,
            }
        }
    }
}
