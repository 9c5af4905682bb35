//! The mapping template every entity mapper follows.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use tracing::{info, warn};

use feed_ingest::{column_names, frame_from_records, record_at, records};
use feed_model::Record;

use crate::entities::ark::ArkRegion;
use crate::rules::{DefaultTable, MappingRule, RuleTable};

/// Values fixed for one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperContext {
    /// Timestamp stamped into outputs that record when they were produced.
    pub run_at: NaiveDateTime,
    /// Ark branch whose registrations are being imported.
    pub region: ArkRegion,
}

impl MapperContext {
    pub fn new(run_at: NaiveDateTime) -> Self {
        Self {
            run_at,
            region: ArkRegion::default(),
        }
    }

    pub fn with_region(mut self, region: ArkRegion) -> Self {
        self.region = region;
        self
    }

    pub fn run_timestamp(&self) -> String {
        self.run_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Resolves one output field.
///
/// A transform runs against the whole input record. A column copy takes the
/// source value when the column exists. Otherwise the default applies, and
/// then the empty string. A failing transform is logged and defaulted.
pub fn resolve_field(
    field: &str,
    rule: Option<&MappingRule>,
    defaults: &DefaultTable,
    input: &Record,
) -> String {
    let fallback = || defaults.get(field).unwrap_or_default().to_string();
    match rule {
        Some(MappingRule::Transform(transform)) => match transform.apply(input) {
            Ok(value) => value,
            Err(error) => {
                warn!(
                    field,
                    transform = transform.name,
                    error = %error,
                    "field mapping failed, using default"
                );
                fallback()
            }
        },
        Some(MappingRule::ColumnCopy(column)) => match input.get_ref(column) {
            Some(value) => value.to_string(),
            None => fallback(),
        },
        Some(MappingRule::Constant(value)) => value.clone(),
        None => fallback(),
    }
}

/// Resolves every field of `rules` in layout order.
pub fn resolve_record(rules: &RuleTable, defaults: &DefaultTable, input: &Record) -> Record {
    let mut output = Record::with_capacity(rules.len());
    for (field, rule) in rules.fields() {
        output.push(field, resolve_field(field, rule, defaults, input));
    }
    output
}

/// A record-to-record mapper for one output template.
///
/// Implementors supply the rule table and defaults, and may override
/// [`Mapper::apply_custom_rules`]. An override of
/// [`Mapper::apply_custom_rules_batch`] must give the same result as the
/// single-record hook applied row by row.
pub trait Mapper: Send + Sync {
    /// Stable identifier used in logs (e.g., "mirail_contract").
    fn name(&self) -> &'static str;

    /// Business label used in the output file name.
    fn output_label(&self) -> String;

    fn rules(&self) -> &RuleTable;

    fn defaults(&self) -> &DefaultTable;

    /// Table-level preparation run before [`Mapper::map_many`] by pipelines.
    fn prepare(&self, input: DataFrame) -> Result<DataFrame> {
        Ok(input)
    }

    fn apply_custom_rules(&self, _output: &mut Record, _input: &Record) {}

    fn apply_custom_rules_batch(&self, output: &mut DataFrame, input: &DataFrame) -> Result<()> {
        let headers = column_names(output);
        let mut rows = Vec::with_capacity(output.height());
        for row in 0..output.height() {
            let mut record = record_at(output, row);
            self.apply_custom_rules(&mut record, &record_at(input, row));
            rows.push(record);
        }
        *output = frame_from_records(&headers, &rows)?;
        Ok(())
    }

    fn map_one(&self, input: &Record) -> Record {
        let mut output = resolve_record(self.rules(), self.defaults(), input);
        self.apply_custom_rules(&mut output, input);
        output
    }

    fn map_many(&self, input: &DataFrame) -> Result<DataFrame> {
        info!(mapper = self.name(), rows = input.height(), "mapping started");
        let mapped: Vec<Record> = records(input)
            .iter()
            .map(|record| resolve_record(self.rules(), self.defaults(), record))
            .collect();
        let mut output = frame_from_records(&self.rules().headers(), &mapped)
            .with_context(|| format!("build {} output", self.name()))?;
        self.apply_custom_rules_batch(&mut output, input)?;
        info!(
            mapper = self.name(),
            rows = output.height(),
            columns = output.width(),
            "mapping complete"
        );
        Ok(output)
    }
}
