use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CatchmentError, Result};

/// A single measurement as delivered by a site export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Local time the measurement was taken.
    pub timestamp: NaiveDateTime,
    /// Identifier of the monitoring site.
    pub site_id: String,
    /// Measured value; `None` when the export left the field blank.
    pub value: Option<f64>,
}

impl RawRecord {
    pub fn new(timestamp: NaiveDateTime, site_id: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            timestamp,
            site_id: site_id.into(),
            value,
        }
    }
}

// ── RecordSchema ──────────────────────────────────────────────────────────────

/// Column names of the three required fields in a site export, and the
/// order in which its dates are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub date_column: String,
    pub site_column: String,
    pub value_column: String,
    /// `true` for `dd/mm/yyyy` dates.
    pub day_first: bool,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            site_column: "Site".to_string(),
            value_column: "Rainfall (mm)".to_string(),
            day_first: true,
        }
    }
}

impl RecordSchema {
    /// Default column names with a different measurement column.
    pub fn for_measurement(value_column: impl Into<String>) -> Self {
        Self {
            value_column: value_column.into(),
            ..Self::default()
        }
    }

    /// The required columns, in `(date, site, value)` order.
    pub fn required_columns(&self) -> [&str; 3] {
        [
            self.date_column.as_str(),
            self.site_column.as_str(),
            self.value_column.as_str(),
        ]
    }
}

// ── Reduction ─────────────────────────────────────────────────────────────────

/// Per-column reduction applied to each daily bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    Total,
    Mean,
    Max,
    Min,
}

impl Reduction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reduction::Total => "total",
            Reduction::Mean => "mean",
            Reduction::Max => "max",
            Reduction::Min => "min",
        }
    }
}

// ── Statistic ─────────────────────────────────────────────────────────────────

/// What an analysis run computes from the built table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// One of the daily reductions.
    Daily(Reduction),
    /// Column-wise rescaling by each column's maximum.
    Normalise,
}

impl FromStr for Statistic {
    type Err = CatchmentError;

    /// Case-insensitive; accepts `total`, `mean`, `max`, `min` and
    /// `normalise` (or `normalize`).
    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "total" => Ok(Statistic::Daily(Reduction::Total)),
            "mean" => Ok(Statistic::Daily(Reduction::Mean)),
            "max" => Ok(Statistic::Daily(Reduction::Max)),
            "min" => Ok(Statistic::Daily(Reduction::Min)),
            "normalise" | "normalize" => Ok(Statistic::Normalise),
            other => Err(CatchmentError::Config(format!(
                "unknown statistic \"{}\"",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statistic::Daily(reduction) => write!(f, "daily {}", reduction.as_str()),
            Statistic::Normalise => write!(f, "normalise"),
        }
    }
}

// ── EmptyBucketPolicy ─────────────────────────────────────────────────────────

/// What mean/max/min produce for a bucket with no values in a column.
///
/// Totals are unaffected: an empty bucket always sums to `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyBucketPolicy {
    /// Emit a missing cell.
    #[default]
    Missing,
    /// Abort with [`CatchmentError::EmptyReduction`].
    Fail,
}

impl FromStr for EmptyBucketPolicy {
    type Err = CatchmentError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "missing" => Ok(EmptyBucketPolicy::Missing),
            "fail" => Ok(EmptyBucketPolicy::Fail),
            other => Err(CatchmentError::Config(format!(
                "unknown empty-bucket policy \"{}\"",
                other
            ))),
        }
    }
}

// ── AnalysisOptions ───────────────────────────────────────────────────────────

/// Everything one analysis run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub schema: RecordSchema,
    pub statistic: Statistic,
    pub empty_bucket: EmptyBucketPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            schema: RecordSchema::default(),
            statistic: Statistic::Daily(Reduction::Mean),
            empty_bucket: EmptyBucketPolicy::default(),
        }
    }
}
