//! Polars helpers for string-typed contract frames.
//!
//! Every frame produced by this crate holds string columns. These helpers
//! read cells back as text, address columns by [`ColumnRef`], and rebuild
//! frames from column vectors or records.

use anyhow::Result;
use polars::prelude::{
    AnyValue, BooleanChunked, Column, DataFrame, IntoColumn, NamedFrom, NewChunkedArray, Series,
};

use feed_model::{ColumnRef, Record};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, properly formats numeric types.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Resolves a column reference to a position in `df`.
pub fn column_position(df: &DataFrame, column: &ColumnRef) -> Option<usize> {
    match column {
        ColumnRef::Name(name) => df.get_column_index(name),
        ColumnRef::Index(index) => (*index < df.width()).then_some(*index),
    }
}

pub fn has_column(df: &DataFrame, column: &ColumnRef) -> bool {
    column_position(df, column).is_some()
}

/// Reads a whole column as text, or `None` when the column does not exist.
pub fn column_values(df: &DataFrame, column: &ColumnRef) -> Option<Vec<String>> {
    let position = column_position(df, column)?;
    let series = &df.get_columns()[position];
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string(series.get(idx).unwrap_or(AnyValue::Null)));
    }
    Some(values)
}

pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string(series.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

pub fn set_string_column(df: &mut DataFrame, name: &str, values: Vec<String>) -> Result<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

pub fn filter_rows(df: &mut DataFrame, keep: &[bool]) -> Result<()> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    *df = df.filter(&mask)?;
    Ok(())
}

/// Builds a frame of string columns in the given order.
pub fn string_frame(columns: Vec<(String, Vec<String>)>) -> Result<DataFrame> {
    let cols: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    Ok(DataFrame::new(cols)?)
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Reads row `row` as a record keyed by the frame's column names.
pub fn record_at(df: &DataFrame, row: usize) -> Record {
    let mut record = Record::with_capacity(df.width());
    for column in df.get_columns() {
        let value = any_to_string(column.get(row).unwrap_or(AnyValue::Null));
        record.push(column.name().as_str(), value);
    }
    record
}

pub fn records(df: &DataFrame) -> Vec<Record> {
    (0..df.height()).map(|row| record_at(df, row)).collect()
}

/// Builds a frame from records sharing `headers`, read by position.
pub fn frame_from_records(headers: &[String], records: &[Record]) -> Result<DataFrame> {
    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let values = records
                .iter()
                .map(|record| record.get_index(idx).unwrap_or_default().to_string())
                .collect();
            (header.clone(), values)
        })
        .collect();
    string_frame(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_df(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
        string_frame(
            columns
                .into_iter()
                .map(|(name, values)| {
                    (
                        name.to_string(),
                        values.into_iter().map(String::from).collect(),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn format_numeric_strips_trailing_zeros() {
        assert_eq!(format_numeric(10000.0), "10000");
        assert_eq!(format_numeric(2.50), "2.5");
        assert_eq!(format_numeric(-3.0), "-3");
    }

    #[test]
    fn column_refs_resolve_by_name_and_index() {
        let df = test_df(vec![("a", vec!["1", "2"]), ("b", vec!["x", "y"])]);
        assert_eq!(column_position(&df, &ColumnRef::name("b")), Some(1));
        assert_eq!(column_position(&df, &ColumnRef::index(0)), Some(0));
        assert_eq!(column_position(&df, &ColumnRef::index(2)), None);
        assert_eq!(column_values(&df, &ColumnRef::index(1)).unwrap(), vec!["x", "y"]);
        assert!(column_values(&df, &ColumnRef::name("c")).is_none());
    }

    #[test]
    fn filter_rows_applies_mask() {
        let mut df = test_df(vec![("a", vec!["1", "2", "3"])]);
        filter_rows(&mut df, &[true, false, true]).unwrap();
        assert_eq!(string_column(&df, "a").unwrap(), vec!["1", "3"]);
    }

    #[test]
    fn records_round_trip_through_frames() {
        let df = test_df(vec![("a", vec!["1", "2"]), ("b", vec!["x", ""])]);
        let rows = records(&df);
        assert_eq!(rows[1].get("a"), Some("2"));
        assert_eq!(rows[1].get("b"), Some(""));
        let rebuilt = frame_from_records(&column_names(&df), &rows).unwrap();
        assert!(rebuilt.equals(&df));
    }
}
