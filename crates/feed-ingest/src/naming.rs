//! Output naming conventions.

use chrono::NaiveDate;

/// Column-name prefix for template columns whose header must be written blank.
pub const BLANK_COLUMN_PREFIX: &str = "__blank_";

pub fn blank_column_name(ordinal: usize) -> String {
    format!("{BLANK_COLUMN_PREFIX}{ordinal}")
}

pub fn is_blank_column(name: &str) -> bool {
    name.starts_with(BLANK_COLUMN_PREFIX)
}

/// Header text as written to the output file.
pub fn display_header(name: &str) -> &str {
    if is_blank_column(name) { "" } else { name }
}

/// Generated output file name: `{MMDD}{label}.csv`.
pub fn output_filename(date: NaiveDate, label: &str) -> String {
    format!("{}{label}.csv", date.format("%m%d"))
}
