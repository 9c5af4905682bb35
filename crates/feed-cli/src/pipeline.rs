//! Feed processing pipelines with explicit stages.
//!
//! Every pipeline follows the same stages in order:
//! 1. **Ingest**: read the contract list into a string frame
//! 2. **Filter**: name-addressed entity filters or the positional engine
//! 3. **Map**: resolve the output template for each remaining row
//! 4. **Output**: write `{MMDD}{label}.csv`, unless this is a dry run
//!
//! Nothing is written until every earlier stage has succeeded.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use feed_filter::{
    ContractFilter, EngineReport, FilterEngine, FilterOverrides, FilterRegistry, FilterReport,
    FilterRun,
};
use feed_ingest::{output_filename, read_csv, write_csv};
use feed_map::{
    ArkRegion, AutocallHistoryMapper, HistoryTarget, Mapper, MapperContext, MapperRegistry,
    PositionalDialerMapper,
};
use feed_model::{FeedError, PhoneTarget, canonical_entity, canonical_role};

/// Run-wide settings shared by every pipeline.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Timestamp of the run; its date is "today" for the date filters.
    pub run_at: NaiveDateTime,
    pub output_dir: PathBuf,
    /// Report counts without writing the output file.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn today(&self) -> NaiveDate {
        self.run_at.date()
    }

    fn mapper_context(&self) -> MapperContext {
        MapperContext::new(self.run_at)
    }
}

/// Row counts around one filter stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRow {
    pub label: String,
    pub before: usize,
    pub after: usize,
    pub applied: bool,
}

impl StageRow {
    pub fn excluded(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    /// Business label used in the output file name.
    pub label: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub output_columns: usize,
    pub stages: Vec<StageRow>,
    /// Human-readable stage log in the order the stages ran.
    pub report_lines: Vec<String>,
    /// Where the output was (or, for a dry run, would have been) written.
    pub output_path: PathBuf,
    pub written: bool,
}

impl RunSummary {
    fn new(label: String, input_rows: usize, output: &DataFrame, options: &RunOptions) -> Self {
        let output_path = options
            .output_dir
            .join(output_filename(options.today(), &label));
        Self {
            label,
            input_rows,
            output_rows: output.height(),
            output_columns: output.width(),
            stages: Vec::new(),
            report_lines: Vec::new(),
            output_path,
            written: false,
        }
    }

    fn with_filter_report(mut self, report: &FilterReport) -> Self {
        self.stages = report
            .stages
            .iter()
            .map(|stage| StageRow {
                label: stage.label.clone(),
                before: stage.before,
                after: stage.after,
                applied: stage.applied,
            })
            .collect();
        self.report_lines = report.lines();
        self
    }

    fn with_engine_report(mut self, report: &EngineReport) -> Self {
        self.stages = report
            .steps
            .iter()
            .map(|step| StageRow {
                label: step.label.clone(),
                before: step.before,
                after: step.after,
                applied: step.applied,
            })
            .collect();
        self.report_lines = report.lines();
        self
    }
}

/// A name-addressed feed request and its per-run overrides.
#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    pub entity: String,
    pub role: String,
    pub overrides: FilterOverrides,
    /// Only read by the Ark registration template.
    pub region: ArkRegion,
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

pub fn ingest(input: &Path) -> Result<DataFrame> {
    let span = info_span!("ingest", input = %input.display());
    let _guard = span.enter();
    let start = Instant::now();
    let df = read_csv(input)?;
    info!(
        rows = df.height(),
        columns = df.width(),
        duration_ms = start.elapsed().as_millis(),
        "contract list loaded"
    );
    Ok(df)
}

// ============================================================================
// Stage 4: Output
// ============================================================================

/// Writes `output` to the summary's path unless this is a dry run.
pub fn output(output: &DataFrame, summary: &mut RunSummary, options: &RunOptions) -> Result<()> {
    if options.dry_run {
        info!(path = %summary.output_path.display(), "dry run, output not written");
        return Ok(());
    }
    fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("create output dir {}", options.output_dir.display()))?;
    write_csv(output, &summary.output_path)?;
    summary.written = true;
    info!(
        path = %summary.output_path.display(),
        rows = output.height(),
        "output written"
    );
    Ok(())
}

// ============================================================================
// Pipelines
// ============================================================================

/// Filters (when the entity has a filter registration), maps (when it has a
/// mapper registration) and writes one contract list.
///
/// A pair with a filter but no mapper writes the filtered rows unchanged,
/// labelled `{entity}_{role}`. A pair with neither is a configuration error.
pub fn run_feed(
    input: &Path,
    request: &FeedRequest,
    filters: &FilterRegistry,
    mappers: &MapperRegistry,
    options: &RunOptions,
) -> Result<RunSummary> {
    let entity = canonical_entity(&request.entity);
    let role = canonical_role(&request.role);
    let span = info_span!("run", entity = %entity, role = %role);
    let _guard = span.enter();

    let filter: Option<Box<dyn ContractFilter>> = if filters.contains(&entity, &role) {
        Some(filters.create(&entity, &role, &request.overrides)?)
    } else {
        None
    };
    let mapper = if mappers.contains(&entity, &role) || filter.is_none() {
        let context = options.mapper_context().with_region(request.region);
        Some(mappers.create(&entity, &role, &context)?)
    } else {
        None
    };

    let mut df = ingest(input)?;
    let input_rows = df.height();

    let mut report = FilterReport::new();
    if let Some(filter) = &filter {
        let mut run = FilterRun::with_report(options.today());
        filter
            .apply_all_filters(&mut df, &mut run)
            .with_context(|| format!("filter {entity}/{role}"))?;
        report = run.into_report().unwrap_or_default();
    } else {
        debug!("no filter registration, rows pass through");
    }

    let (label, mapped) = match &mapper {
        Some(mapper) => (mapper.output_label(), map_frame(mapper.as_ref(), df)?),
        None => {
            debug!("no mapper registration, filtered rows written as read");
            (format!("{entity}_{role}"), df)
        }
    };

    let mut summary =
        RunSummary::new(label, input_rows, &mapped, options).with_filter_report(&report);
    output(&mapped, &mut summary, options)?;
    Ok(summary)
}

/// Settings for the positional Mirail autocall run.
#[derive(Debug, Clone)]
pub struct AutocallRequest {
    pub target: PhoneTarget,
    pub without_10k: bool,
    /// JSON step list replacing the built-in ordering.
    pub steps_file: Option<PathBuf>,
}

impl AutocallRequest {
    pub fn label(&self) -> String {
        let variant = if self.without_10k {
            "without10k"
        } else {
            "with10k"
        };
        format!("ミライル_{variant}_{}", self.target.label())
    }

    pub fn engine(&self) -> Result<FilterEngine> {
        let Some(path) = &self.steps_file else {
            return Ok(FilterEngine::mirail_autocall(self.target, self.without_10k));
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("read steps file {}", path.display()))?;
        FilterEngine::from_json(&json).map_err(|error| {
            FeedError::InvalidConfig(format!("steps file {}: {error:#}", path.display())).into()
        })
    }
}

/// Positional engine, then the index-based dialer mapping.
pub fn run_autocall(
    input: &Path,
    request: &AutocallRequest,
    options: &RunOptions,
) -> Result<RunSummary> {
    let span = info_span!(
        "autocall",
        phone_target = request.target.as_str(),
        without_10k = request.without_10k
    );
    let _guard = span.enter();

    let engine = request.engine()?;
    let mut df = ingest(input)?;
    let input_rows = df.height();
    let report = engine
        .apply(&mut df, options.today())
        .context("apply autocall filter steps")?;
    let mapper = PositionalDialerMapper::new(request.target);
    let mapped = map_frame(&mapper, df)?;

    let mut summary = RunSummary::new(request.label(), input_rows, &mapped, options)
        .with_engine_report(&report);
    output(&mapped, &mut summary, options)?;
    Ok(summary)
}

/// Negotiation-history rows for one autocall result export.
pub fn run_history(input: &Path, target: HistoryTarget, options: &RunOptions) -> Result<RunSummary> {
    let span = info_span!("history", history_target = %target);
    let _guard = span.enter();

    let df = ingest(input)?;
    let input_rows = df.height();
    let mapper = AutocallHistoryMapper::new(target);
    let mapped = map_frame(&mapper, df)?;

    let mut summary = RunSummary::new(mapper.output_label(), input_rows, &mapped, options);
    output(&mapped, &mut summary, options)?;
    Ok(summary)
}

// ============================================================================
// Stage 3: Map
// ============================================================================

fn map_frame(mapper: &dyn Mapper, df: DataFrame) -> Result<DataFrame> {
    let span = info_span!("map", mapper = mapper.name());
    let _guard = span.enter();
    let prepared = mapper
        .prepare(df)
        .with_context(|| format!("prepare {}", mapper.name()))?;
    mapper
        .map_many(&prepared)
        .with_context(|| format!("map {}", mapper.name()))
}
