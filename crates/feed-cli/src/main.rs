//! Contract feed CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use feed_cli::logging::{LogConfig, LogFormat, init_logging};
use feed_cli::summary::print_summary;
use feed_model::FeedError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_autocall_list, run_contract_feed, run_history_import, run_list};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Run(args) => run_contract_feed(args).map(|summary| print_summary(&summary)),
        Command::Autocall(args) => run_autocall_list(args).map(|summary| print_summary(&summary)),
        Command::History(args) => run_history_import(args).map(|summary| print_summary(&summary)),
        Command::List => run_list(),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            exit_code_for(&error)
        }
    };
    std::process::exit(exit_code);
}

/// 2 for configuration errors anywhere in the chain, otherwise 1.
fn exit_code_for(error: &anyhow::Error) -> i32 {
    let configuration = error.chain().any(|cause| {
        cause
            .downcast_ref::<FeedError>()
            .is_some_and(FeedError::is_configuration)
    });
    if configuration { 2 } else { 1 }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
