use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};

use feed_cli::pipeline::{
    AutocallRequest, FeedRequest, RunOptions, RunSummary, run_autocall, run_feed, run_history,
};
use feed_cli::summary::print_registrations;
use feed_filter::{FilterOverrides, FilterRegistry};
use feed_map::MapperRegistry;

use crate::cli::{AutocallArgs, HistoryArgs, OutputArgs, RunArgs};

pub fn run_list() -> Result<()> {
    let filters = FilterRegistry::with_defaults();
    let mappers = MapperRegistry::with_defaults();
    print_registrations(&filters.registrations(), &mappers.registrations());
    Ok(())
}

pub fn run_contract_feed(args: &RunArgs) -> Result<RunSummary> {
    let request = FeedRequest {
        entity: args.entity.clone(),
        role: args.role.clone(),
        overrides: FilterOverrides {
            debt_exclusion: args.debt_exclusion,
            strict_mobile: args.strict_mobile,
            ..FilterOverrides::default()
        },
        region: args.region.into(),
    };
    let options = run_options(&args.output, &args.input);
    run_feed(
        &args.input,
        &request,
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options,
    )
}

pub fn run_autocall_list(args: &AutocallArgs) -> Result<RunSummary> {
    let request = AutocallRequest {
        target: args.target.into(),
        without_10k: args.without_10k,
        steps_file: args.steps.clone(),
    };
    run_autocall(&args.input, &request, &run_options(&args.output, &args.input))
}

pub fn run_history_import(args: &HistoryArgs) -> Result<RunSummary> {
    run_history(
        &args.input,
        args.target.into(),
        &run_options(&args.output, &args.input),
    )
}

fn run_options(args: &OutputArgs, input: &Path) -> RunOptions {
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    RunOptions {
        run_at: run_at(args),
        output_dir,
        dry_run: args.dry_run,
    }
}

/// `--today` replaces the date; the wall-clock time is kept.
fn run_at(args: &OutputArgs) -> NaiveDateTime {
    let now = Local::now().naive_local();
    match args.today {
        Some(today) => today.and_time(now.time()),
        None => now,
    }
}
