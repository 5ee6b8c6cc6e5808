//! CLI argument definitions for the datalist browser.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "datalist",
    version,
    about = "Browse CSV data as a paginated, ordered, filtered list",
    long_about = "Browse CSV data as a paginated, ordered, filtered list.\n\n\
                  Request parameters are given as key=value pairs, list state can be\n\
                  kept in a JSON session file between runs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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

    /// Prefix log lines with timestamps.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show one page of a CSV file.
    List(ListArgs),

    /// List the columns of a CSV file with their order and filter names.
    Columns(ColumnsArgs),
}

#[derive(Parser)]
pub struct ListArgs {
    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Request parameter as key=value. Repeat a key to pass a list.
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// List configuration file (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Page to show (same as `-p page=N`).
    #[arg(long = "page")]
    pub page: Option<u32>,

    /// Rows per page (same as `-p onpage=N`).
    #[arg(long = "on-page")]
    pub on_page: Option<u32>,

    /// Order token, e.g. `name-ASC` (same as `-p order=...`).
    #[arg(long = "order", value_name = "NAME-DIR")]
    pub order: Option<String>,

    /// Session file (JSON) used to restore and persist list state.
    #[arg(long = "session", value_name = "PATH")]
    pub session: Option<PathBuf>,

    /// Session section holding this list's state.
    #[arg(long = "section", default_value = "datalist")]
    pub section: String,

    /// Column identifying a row.
    #[arg(long = "id-column", value_name = "COLUMN")]
    pub id_column: Option<String>,

    /// Column referencing the parent row's id; shows rows as a tree.
    #[arg(long = "parent-column", value_name = "COLUMN", requires = "id_column")]
    pub parent_column: Option<String>,

    /// Count distinct ids instead of rows.
    #[arg(long = "distinct-count", requires = "id_column")]
    pub distinct_count: bool,

    /// Omit parameters equal to their defaults from the printed parameters.
    #[arg(long = "canonical")]
    pub canonical: bool,
}

#[derive(Parser)]
pub struct ColumnsArgs {
    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,
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
