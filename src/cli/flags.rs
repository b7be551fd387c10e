use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::output::ReportFormat;
use crate::core::types::{SortKey, SortOrder};

#[derive(Parser, Debug)]
#[command(
    name = "threat-triage",
    version,
    about = "AI-assisted triage for security event logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML). Default: config/triage.toml
    #[arg(long)]
    pub config: Option<String>,

    /// Increase verbosity (info, debug, trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Optional log file path
    #[arg(long, default_value = "data/triage.log")]
    pub log_file: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a security event log for analysis
    Analyze {
        /// Log text to analyze
        log: Option<String>,
        /// Read the log from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
        /// Skip the workflow and use the keyword fallback classifier
        #[arg(long)]
        offline: bool,
    },
    /// List stored analyses
    History {
        #[arg(long, value_enum, default_value = "timestamp")]
        sort_by: SortKeyArg,
        #[arg(long, value_enum, default_value = "desc")]
        order: SortOrderArg,
        /// Minimum threat score (inclusive)
        #[arg(long, default_value_t = 0)]
        min_score: u8,
        /// Maximum threat score (inclusive)
        #[arg(long, default_value_t = 100)]
        max_score: u8,
    },
    /// Delete one stored analysis by id
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Remove all stored analyses
    Clear,
    /// Show aggregate statistics over stored analyses
    Stats,
    /// Write a history report (markdown or JSON)
    Report {
        #[arg(long, value_enum, default_value = "markdown")]
        format: ReportFormatArg,
        #[arg(long, default_value = "out/report.md")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum SortKeyArg {
    Timestamp,
    ThreatScore,
    Technique,
}

impl From<SortKeyArg> for SortKey {
    fn from(value: SortKeyArg) -> Self {
        match value {
            SortKeyArg::Timestamp => SortKey::Timestamp,
            SortKeyArg::ThreatScore => SortKey::ThreatScore,
            SortKeyArg::Technique => SortKey::Technique,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
pub enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(value: SortOrderArg) -> Self {
        match value {
            SortOrderArg::Asc => SortOrder::Asc,
            SortOrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
pub enum ReportFormatArg {
    Markdown,
    Json,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(value: ReportFormatArg) -> Self {
        match value {
            ReportFormatArg::Markdown => ReportFormat::Markdown,
            ReportFormatArg::Json => ReportFormat::Json,
        }
    }
}
