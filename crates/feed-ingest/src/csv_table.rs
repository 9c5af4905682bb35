use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use polars::prelude::DataFrame;
use tracing::debug;

use crate::naming::display_header;
use crate::polars_utils::{column_names, column_values, string_frame};
use feed_model::ColumnRef;

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Converts the table into a frame of string columns.
    pub fn into_frame(self) -> Result<DataFrame> {
        let mut columns: Vec<(String, Vec<String>)> = self
            .headers
            .into_iter()
            .map(|header| (header, Vec::with_capacity(self.rows.len())))
            .collect();
        for row in self.rows {
            for (idx, value) in row.into_iter().enumerate() {
                if let Some((_, values)) = columns.get_mut(idx) {
                    values.push(value);
                }
            }
        }
        string_frame(columns)
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Cells keep their surrounding whitespace; only a stray BOM is removed.
fn normalize_cell(raw: &str) -> String {
    raw.trim_matches('\u{feff}').to_string()
}

/// Renames repeated headers to `name.1`, `name.2`, ... and blank headers to
/// `Unnamed: N`, keeping the first occurrence unchanged.
pub fn mangle_duplicate_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut out = Vec::with_capacity(headers.len());
    for (idx, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Reads a headed CSV. Short rows are padded with blanks; a row longer than
/// the header is an error.
pub fn read_csv_table_from_reader<R: Read>(reader: R) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = reader.records();
    let Some(first) = records.next() else {
        return Ok(CsvTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    };
    let first = first.context("read record 1")?;
    let headers = mangle_duplicate_headers(first.iter().map(normalize_header).collect());
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, record) in records.enumerate() {
        let number = idx + 2;
        let record = record.with_context(|| format!("read record {number}"))?;
        let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        if row.len() > headers.len() {
            bail!(
                "record {number} has {} fields but the header has {}",
                row.len(),
                headers.len()
            );
        }
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    debug!(columns = headers.len(), rows = rows.len(), "csv table loaded");
    Ok(CsvTable { headers, rows })
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let file = File::open(path).with_context(|| format!("read csv: {}", path.display()))?;
    read_csv_table_from_reader(file).with_context(|| format!("parse csv: {}", path.display()))
}

/// Loads a UTF-8 contract list into a frame of string columns.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    read_csv_table(path)?
        .into_frame()
        .with_context(|| format!("build frame: {}", path.display()))
}

/// Writes `df` as CSV with a UTF-8 BOM. Placeholder columns get blank headers.
pub fn write_csv_to<W: Write>(df: &DataFrame, mut out: W) -> Result<()> {
    out.write_all(UTF8_BOM.as_bytes())
        .context("write byte order mark")?;
    let mut writer = WriterBuilder::new().from_writer(out);
    let names = column_names(df);
    writer
        .write_record(names.iter().map(|name| display_header(name)))
        .context("write headers")?;
    let columns: Vec<Vec<String>> = (0..df.width())
        .map(|idx| column_values(df, &ColumnRef::Index(idx)).unwrap_or_default())
        .collect();
    for row in 0..df.height() {
        writer
            .write_record(columns.iter().map(|values| values[row].as_str()))
            .with_context(|| format!("write row {}", row + 1))?;
    }
    writer.flush().context("flush csv output")?;
    Ok(())
}

pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv_to(df, BufWriter::new(file))
}
