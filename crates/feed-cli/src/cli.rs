//! CLI argument definitions for the contract feed tool.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use feed_map::{ArkRegion, HistoryTarget};
use feed_model::PhoneTarget;

#[derive(Parser)]
#[command(
    name = "contract-feed",
    version,
    about = "Filter and map debt-servicing contract lists into dialer and registration files",
    long_about = "Filter and map debt-servicing contract lists.\n\n\
                  Produces autocall dialer lists, registration templates and\n\
                  negotiation-history imports named {MMDD}{label}.csv."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Filter and map a contract list for one entity and role.
    Run(RunArgs),

    /// Build a Mirail autocall list with the positional filter engine.
    Autocall(AutocallArgs),

    /// Convert an autocall result export into negotiation-history rows.
    History(HistoryArgs),

    /// List the filter and mapper registrations.
    List,
}

/// Flags shared by every command that writes a file.
#[derive(Parser)]
pub struct OutputArgs {
    /// Output directory (default: the directory holding INPUT).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run date used by the date filters and the output name (YYYY-MM-DD).
    #[arg(long = "today", value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Report counts without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Entity name (mirail, faith, faith_sms, plaza, capco, ark).
    #[arg(long = "entity")]
    pub entity: String,

    /// Role within the entity (e.g. contract, guarantor, emergency_contact, main).
    #[arg(long = "role")]
    pub role: String,

    /// Path to the contract list CSV.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Drop client codes 1 and 4 carrying a 10,000 or 11,000 yen balance.
    #[arg(long = "debt-exclusion")]
    pub debt_exclusion: bool,

    /// Require hyphenated 090/080/070 mobile numbers.
    #[arg(long = "strict-mobile")]
    pub strict_mobile: bool,

    /// Ark branch written into the registration template.
    #[arg(long = "region", value_enum, default_value = "tokyo")]
    pub region: RegionArg,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct AutocallArgs {
    /// Person whose mobile number is dialled.
    #[arg(long = "target", value_enum)]
    pub target: TargetArg,

    /// Also drop the fixed-fee 10,000 and 11,000 yen balances.
    #[arg(long = "without-10k")]
    pub without_10k: bool,

    /// Path to the contract list CSV.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON step list replacing the built-in filter order.
    #[arg(long = "steps", value_name = "FILE")]
    pub steps: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Person the autocall batch targeted.
    #[arg(long = "target", value_enum)]
    pub target: HistoryTargetArg,

    /// Path to the autocall result CSV.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TargetArg {
    Contract,
    Guarantor,
    #[value(name = "emergency_contact", alias = "emergency")]
    EmergencyContact,
}

impl From<TargetArg> for PhoneTarget {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Contract => PhoneTarget::Contract,
            TargetArg::Guarantor => PhoneTarget::Guarantor,
            TargetArg::EmergencyContact => PhoneTarget::EmergencyContact,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum HistoryTargetArg {
    Contract,
    Guarantor,
    #[value(alias = "emergency_contact")]
    Contact,
    Workplace,
}

impl From<HistoryTargetArg> for HistoryTarget {
    fn from(value: HistoryTargetArg) -> Self {
        match value {
            HistoryTargetArg::Contract => HistoryTarget::Contract,
            HistoryTargetArg::Guarantor => HistoryTarget::Guarantor,
            HistoryTargetArg::Contact => HistoryTarget::Contact,
            HistoryTargetArg::Workplace => HistoryTarget::Workplace,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RegionArg {
    #[value(alias = "1")]
    Tokyo,
    #[value(alias = "2")]
    Osaka,
    #[value(alias = "3")]
    Hokkaido,
    #[value(name = "kita_kanto", alias = "4")]
    KitaKanto,
}

impl From<RegionArg> for ArkRegion {
    fn from(value: RegionArg) -> Self {
        match value {
            RegionArg::Tokyo => ArkRegion::Tokyo,
            RegionArg::Osaka => ArkRegion::Osaka,
            RegionArg::Hokkaido => ArkRegion::Hokkaido,
            RegionArg::KitaKanto => ArkRegion::KitaKanto,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
