//! Named transforms and the value formatters they share.

use feed_filter::normalize::{is_missing, parse_amount};
use feed_ingest::format_numeric;
use feed_model::Record;
use feed_model::contract_list::header;

use crate::error::TransformError;
use crate::rules::NamedTransform;

/// Characters that upstream operators type around phone numbers.
const PHONE_NOISE: &[char] = &[
    '未', '娘', '父', '母', '本', '人', '代', '理', '自', '宅', '×', '○', '※', 'T', 'E', 'L', '携',
    '帯', 't', 'e', 'l',
];

const MOBILE_PREFIXES: &[&str] = &["090", "080", "070", "050"];

/// Cleans a free-text phone cell into a hyphenated number.
///
/// Annotations such as `未`, `娘` or `TEL` are dropped, then only digits are
/// kept. Eleven-digit mobiles are grouped 3-4-4, ten-digit Tokyo and Osaka
/// numbers 2-4-4 and other ten-digit landlines 3-3-4. Any other length is
/// returned as bare digits.
///
/// ```
/// use feed_map::transforms::extract_clean_phone_number;
///
/// assert_eq!(extract_clean_phone_number("未080-5787-5364"), "080-5787-5364");
/// assert_eq!(extract_clean_phone_number("TEL0312345678"), "03-1234-5678");
/// ```
pub fn extract_clean_phone_number(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let digits: String = trimmed
        .chars()
        .filter(|ch| !PHONE_NOISE.contains(ch))
        .filter_map(ascii_digit)
        .collect();
    format_phone_digits(&digits)
}

/// Accepts ASCII and full-width digits.
fn ascii_digit(ch: char) -> Option<char> {
    match ch {
        '0'..='9' => Some(ch),
        '０'..='９' => char::from_u32(ch as u32 - '０' as u32 + '0' as u32),
        _ => None,
    }
}

fn format_phone_digits(digits: &str) -> String {
    match digits.len() {
        11 if MOBILE_PREFIXES.iter().any(|prefix| digits.starts_with(prefix)) => {
            format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..])
        }
        10 if digits.starts_with("03") || digits.starts_with("06") => {
            format!("{}-{}-{}", &digits[..2], &digits[2..6], &digits[6..])
        }
        10 if digits.starts_with('0') => {
            format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
        }
        _ => digits.to_string(),
    }
}

/// Inserts 3-4-4 hyphens into an unhyphenated eleven-character number.
pub fn format_hyphenated_mobile(value: &str) -> String {
    let trimmed = value.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if trimmed.contains('-') || chars.len() != 11 {
        return trimmed.to_string();
    }
    let part = |range: std::ops::Range<usize>| chars[range].iter().collect::<String>();
    format!("{}-{}-{}", part(0..3), part(3..7), part(7..11))
}

/// Rounds to whole yen and groups thousands: `12500.4` becomes `12,500`.
pub fn thousands(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Drops the fractional part of an amount; `None` when it does not parse.
pub fn truncate_amount(value: &str) -> Option<String> {
    parse_amount(value).map(|amount| (amount.trunc() as i64).to_string())
}

pub const FAITH_CLIENT_NAME: NamedTransform =
    NamedTransform::new("faith_client_name", faith_client_name);

/// `フェイス{n}` from the integral trustee id; blank ids map to blank.
pub fn faith_client_name(input: &Record) -> Result<String, TransformError> {
    let Some(raw) = input.get(header::TRUSTEE_ID) else {
        return Ok(String::new());
    };
    if is_missing(raw) {
        return Ok(String::new());
    }
    let id = parse_amount(raw).ok_or_else(|| TransformError::InvalidNumber {
        column: header::TRUSTEE_ID.to_string(),
        value: raw.to_string(),
    })?;
    Ok(format!("フェイス{}", id.trunc() as i64))
}

pub const CAPCO_PHONE_COLUMN: &str = "契約者：電話番号";

pub const CAPCO_MOBILE: NamedTransform = NamedTransform::new("capco_mobile", capco_mobile);

pub fn capco_mobile(input: &Record) -> Result<String, TransformError> {
    Ok(input
        .get(CAPCO_PHONE_COLUMN)
        .map(extract_clean_phone_number)
        .unwrap_or_default())
}

pub const DEBT_DIFFERENCE: NamedTransform =
    NamedTransform::new("debt_difference", debt_difference);

/// `更新後残債 - 現在残債`, or `0` when either side does not parse.
pub fn debt_difference(input: &Record) -> Result<String, TransformError> {
    let current = required(input, "現在残債")?;
    let updated = required(input, "更新後残債")?;
    Ok(match (parse_amount(current), parse_amount(updated)) {
        (Some(current), Some(updated)) => format_numeric(updated - current),
        _ => "0".to_string(),
    })
}

pub const ARK_MANAGEMENT_COMPANY: NamedTransform =
    NamedTransform::new("ark_management_company", ark_management_company);

/// The trading partner column of the Ark report, trimmed.
pub fn ark_management_company(input: &Record) -> Result<String, TransformError> {
    Ok(input
        .get("取引先")
        .map(str::trim)
        .unwrap_or_default()
        .to_string())
}

pub const ARK_ARREARS_DIFFERENCE: NamedTransform =
    NamedTransform::new("ark_arrears_difference", ark_arrears_difference);

/// `新残債 - 旧残債` when both columns exist, `0` when either does not parse.
///
/// Without both columns the existing `管理前滞納額` is carried over.
pub fn ark_arrears_difference(input: &Record) -> Result<String, TransformError> {
    match (input.get("新残債"), input.get("旧残債")) {
        (Some(new), Some(old)) => Ok(match (parse_amount(new), parse_amount(old)) {
            (Some(new), Some(old)) => format_numeric(new - old),
            _ => "0".to_string(),
        }),
        _ => required(input, "管理前滞納額").map(str::to_string),
    }
}

pub const HISTORY_NOTE: NamedTransform = NamedTransform::new("history_note", history_note);

/// Negotiation note for one autocall result row.
pub fn history_note(input: &Record) -> Result<String, TransformError> {
    let number = required(input, "架電番号")?;
    let balance = required(input, "残債")?;
    Ok(format!("架電番号{number}オートコール　残債{balance}円"))
}

fn required<'a>(input: &'a Record, column: &str) -> Result<&'a str, TransformError> {
    input
        .get(column)
        .ok_or_else(|| TransformError::MissingColumn(column.to_string()))
}
