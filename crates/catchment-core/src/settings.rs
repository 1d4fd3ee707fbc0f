use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::formatting::OutputFormat;
use crate::models::{AnalysisOptions, EmptyBucketPolicy, RecordSchema, Statistic};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Daily statistics and normalisation for multi-site catchment measurements
#[derive(Parser, Debug, Clone)]
#[command(
    name = "catchment",
    about = "Daily statistics and normalisation for multi-site catchment measurements",
    version
)]
pub struct Settings {
    /// Site export files to analyse (each is processed independently)
    #[arg(required = true, num_args = 1..)]
    pub infiles: Vec<PathBuf>,

    /// Statistic to compute
    #[arg(long, default_value = "mean", value_parser = ["total", "mean", "max", "min", "normalise"])]
    pub statistic: String,

    /// Name of the measurement column to read
    #[arg(short, long, default_value = "Rainfall (mm)")]
    pub measurement: String,

    /// Name of the timestamp column
    #[arg(long, default_value = "Date")]
    pub date_column: String,

    /// Name of the site identifier column
    #[arg(long, default_value = "Site")]
    pub site_column: String,

    /// Parse dates as month/day/year instead of day/month/year
    #[arg(long)]
    pub month_first: bool,

    /// What mean/max/min report for a day with no values
    #[arg(long, default_value = "missing", value_parser = ["missing", "fail"])]
    pub empty_bucket: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "csv", "json"])]
    pub format: String,

    /// Decimal places in text output
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=12))]
    pub decimals: u8,

    /// Logging level (DEBUG, INFO, WARNING, ERROR, CRITICAL) or a tracing
    /// filter directive such as `catchment_data=debug`
    #[arg(long, default_value = "INFO")]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Parse from an explicit argument list; used by tests.
    pub fn try_parse_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    pub fn statistic(&self) -> Result<Statistic> {
        self.statistic.parse()
    }

    pub fn empty_bucket_policy(&self) -> Result<EmptyBucketPolicy> {
        self.empty_bucket.parse()
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format.parse()
    }

    /// Column names and date order the reader should expect.
    pub fn record_schema(&self) -> RecordSchema {
        RecordSchema {
            date_column: self.date_column.clone(),
            site_column: self.site_column.clone(),
            value_column: self.measurement.clone(),
            day_first: !self.month_first,
        }
    }

    /// Typed options for one analysis run.
    ///
    /// Fails with [`crate::error::CatchmentError::Config`] when the statistic
    /// or empty-bucket policy is not a known name.
    pub fn analysis_options(&self) -> Result<AnalysisOptions> {
        Ok(AnalysisOptions {
            schema: self.record_schema(),
            statistic: self.statistic()?,
            empty_bucket: self.empty_bucket_policy()?,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
