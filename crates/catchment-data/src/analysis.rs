//! Main analysis pipeline.
//!
//! Loads records, builds the timestamp table and applies one
//! [`Statistic`], returning the derived table with run metadata.

use std::path::Path;
use std::time::Instant;

use catchment_core::error::Result;
use catchment_core::formatting::{render_table, OutputFormat};
pub use catchment_core::models::AnalysisOptions;
use catchment_core::models::{EmptyBucketPolicy, RawRecord, Statistic};
use catchment_core::table::{DailyTable, TimeTable};
use tracing::debug;

use crate::aggregator::DailyAggregator;
use crate::builder::TableBuilder;
use crate::normalise::normalise;
use crate::reader::read_records;

// ── Public types ──────────────────────────────────────────────────────────────

/// The table a statistic produces: date-indexed for the daily reductions,
/// timestamp-indexed for normalisation. Serialises as the bare table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum DerivedTable {
    Daily(DailyTable),
    Normalised(TimeTable),
}

impl DerivedTable {
    pub fn n_rows(&self) -> usize {
        match self {
            DerivedTable::Daily(t) => t.n_rows(),
            DerivedTable::Normalised(t) => t.n_rows(),
        }
    }

    pub fn n_columns(&self) -> usize {
        match self {
            DerivedTable::Daily(t) => t.n_columns(),
            DerivedTable::Normalised(t) => t.n_columns(),
        }
    }

    pub fn render(&self, format: OutputFormat, decimals: usize) -> Result<String> {
        match self {
            DerivedTable::Daily(t) => render_table(t, format, decimals),
            DerivedTable::Normalised(t) => render_table(t, format, decimals),
        }
    }
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisMetadata {
    /// File the records came from, when they came from a file.
    pub source: Option<String>,
    /// What was computed, e.g. `"daily mean"`.
    pub statistic: String,
    /// Number of raw records read.
    pub records_read: usize,
    /// Number of distinct sites (columns).
    pub sites: usize,
    /// Rows in the timestamp table.
    pub rows_in: usize,
    /// Rows in the derived table.
    pub rows_out: usize,
    /// Wall-clock seconds spent reading the file.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent building and reducing the table.
    pub compute_time_seconds: f64,
}

/// The complete output of [`analyze_file`] / [`analyze_records`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub table: DerivedTable,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Apply `statistic` to an already built table.
pub fn apply_statistic(
    table: &TimeTable,
    statistic: Statistic,
    policy: EmptyBucketPolicy,
) -> Result<DerivedTable> {
    match statistic {
        Statistic::Daily(reduction) => DailyAggregator::new(policy)
            .aggregate(table, reduction)
            .map(DerivedTable::Daily),
        Statistic::Normalise => normalise(table).map(DerivedTable::Normalised),
    }
}

/// Run the pipeline on records already in memory.
pub fn analyze_records(records: &[RawRecord], options: &AnalysisOptions) -> Result<AnalysisResult> {
    let compute_start = Instant::now();
    let table = TableBuilder::build(records)?;
    let derived = apply_statistic(&table, options.statistic, options.empty_bucket)?;
    let compute_time = compute_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        source: None,
        statistic: options.statistic.to_string(),
        records_read: records.len(),
        sites: table.n_columns(),
        rows_in: table.n_rows(),
        rows_out: derived.n_rows(),
        load_time_seconds: 0.0,
        compute_time_seconds: compute_time,
    };

    debug!(
        "{}: {} records, {} sites, {} rows -> {} rows",
        metadata.statistic,
        metadata.records_read,
        metadata.sites,
        metadata.rows_in,
        metadata.rows_out
    );

    Ok(AnalysisResult {
        table: derived,
        metadata,
    })
}

/// Run the full pipeline on one export file.
///
/// 1. Read records from `path` using `options.schema`.
/// 2. Build the timestamp table.
/// 3. Apply `options.statistic`.
pub fn analyze_file(path: &Path, options: &AnalysisOptions) -> Result<AnalysisResult> {
    let load_start = Instant::now();
    let records = read_records(path, &options.schema)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let mut result = analyze_records(&records, options)?;
    result.metadata.source = Some(path.display().to_string());
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
