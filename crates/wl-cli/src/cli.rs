//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wl_core::{AnomalyPolicy, HourlyRate};

/// Calendar worklog and billing report.
///
/// Sums the events of a calendar into a per-day worklog, rounds every day up
/// to whole hours and optionally prices the total at an hourly rate.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize a calendar into a daily worklog.
    Report(ReportArgs),

    /// List the calendars the access token can read.
    Calendars {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for `wl report`.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Calendar name (case-insensitive), or `primary`.
    #[arg(long)]
    pub calendar: String,

    /// Start of the period, inclusive (YYYY-MM-DD or ISO 8601). Defaults to one month ago.
    #[arg(long)]
    pub start: Option<String>,

    /// End of the period, exclusive (YYYY-MM-DD or ISO 8601). Defaults to now.
    #[arg(long)]
    pub end: Option<String>,

    /// Hourly rate used to price the total.
    #[arg(long)]
    pub rate: Option<HourlyRate>,

    /// What to do with events that end before they start.
    #[arg(long, value_name = "clamp|skip|abort")]
    pub on_anomaly: Option<AnomalyPolicy>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
