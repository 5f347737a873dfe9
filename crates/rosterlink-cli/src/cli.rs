//! CLI argument definitions for rosterlink.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rosterlink",
    version,
    about = "Reconcile player names across scouting exports and merge them",
    long_about = "Reconcile player identities across a primary roster export and one or \
                  more secondary metrics exports.\n\n\
                  Names are matched despite accents, reordering, abbreviations and \
                  suffixes; uncertain matches can be reviewed interactively before the \
                  rosters are joined into a single CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -vvv for trace, -q for errors only).
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

    /// Allow player names in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Auto-match names and report what still needs review.
    Match(MatchArgs),

    /// Auto-match, review the remaining names interactively, then export.
    Review(ReviewArgs),

    /// Auto-match (or load saved decisions), then join and export.
    Merge(MergeArgs),

    /// Show how two names score against each other.
    Score(ScoreArgs),
}

/// Input rosters shared by every dataset command.
#[derive(Args, Clone)]
pub struct InputArgs {
    /// Primary roster CSV; its player names are the canonical identities.
    #[arg(long = "primary", value_name = "CSV")]
    pub primary: PathBuf,

    /// Secondary roster CSV (repeatable); its columns are joined onto the primary.
    #[arg(long = "secondary", value_name = "CSV", required = true)]
    pub secondary: Vec<PathBuf>,

    /// Column holding player names (matched case-insensitively).
    #[arg(long = "key-column", value_name = "NAME", default_value = "Player")]
    pub key_column: String,
}

/// Matching policy flags.
#[derive(Args, Clone)]
pub struct PolicyArgs {
    /// Threshold preset.
    #[arg(long = "preset", value_enum, default_value = "default")]
    pub preset: PresetArg,

    /// Minimum score applied without review (overrides the preset).
    #[arg(long = "high", value_name = "SCORE")]
    pub high: Option<f64>,

    /// Minimum score offered as a suggestion (overrides the preset).
    #[arg(long = "low", value_name = "SCORE")]
    pub low: Option<f64>,
}

/// Export flags.
#[derive(Args, Clone)]
pub struct ExportArgs {
    /// Join type for primary rows without a linked secondary row.
    #[arg(long = "join", value_enum, default_value = "inner")]
    pub join: JoinArg,

    /// Suffix every secondary column with its dataset label.
    #[arg(long = "suffix-all")]
    pub suffix_all: bool,

    /// Write the confirmed name mappings as JSON.
    #[arg(long = "mapping-out", value_name = "JSON")]
    pub mapping_out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct MatchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Write the auto-confirmed name mappings as JSON.
    #[arg(long = "mapping-out", value_name = "JSON")]
    pub mapping_out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Merged CSV to write once review is complete.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Skip the automatic first pass; every name is reviewed.
    #[arg(long = "no-auto")]
    pub no_auto: bool,
}

#[derive(Parser)]
pub struct MergeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Merged CSV to write.
    #[arg(long = "output", value_name = "CSV")]
    pub output: PathBuf,

    /// Saved decisions (from --mapping-out) applied before auto-matching.
    #[arg(long = "mapping", value_name = "JSON")]
    pub mapping: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ScoreArgs {
    /// First name.
    pub left: String,

    /// Second name.
    pub right: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Strict,
    Default,
    Relaxed,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum JoinArg {
    Inner,
    Left,
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
