//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use kkv_match::DEFAULT_THRESHOLD;
use kkv_model::RecordField;

#[derive(Parser)]
#[command(
    name = "kk-validator",
    version,
    about = "Validate population-registry records against an administrative gazetteer",
    long_about = "Validate family-card registry extracts.\n\n\
                  Checks identifiers, names, gender and birth dates, and reconciles \
                  free-text places of birth against a village / district / regency / \
                  province gazetteer with exact and fuzzy matching."
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

    /// Allow registry values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate every field of a registry extract.
    Validate(RunArgs),

    /// Reconcile only the place-of-birth column.
    Places(RunArgs),

    /// Load a gazetteer and print its summary.
    Gazetteer(GazetteerArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Registry CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Gazetteer CSV (default: $KKV_GAZETTEER or the bundled boundary file).
    #[arg(long = "gazetteer", value_name = "PATH")]
    pub gazetteer: Option<PathBuf>,

    /// Minimum similarity (0-100) for an approximate match.
    #[arg(long = "threshold", default_value_t = DEFAULT_THRESHOLD,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: u8,

    /// Input field delimiter (guessed from the header when omitted).
    #[arg(long = "delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Output directory (default: <INPUT dir>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Validate and report without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Run on a single thread.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Restrict invalid.csv to rows failing any of these fields.
    ///
    /// Accepts column names (NIK, TEMPAT_LAHIR, ...). Repeatable.
    #[arg(long = "failed-field", value_name = "FIELD", value_parser = parse_field)]
    pub failed_fields: Vec<RecordField>,
}

#[derive(Args)]
pub struct GazetteerArgs {
    /// Gazetteer CSV (default: $KKV_GAZETTEER or the bundled boundary file).
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Gazetteer field delimiter.
    #[arg(long = "delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got '{value}'")),
        },
    }
}

fn parse_field(value: &str) -> Result<RecordField, String> {
    value.parse()
}
