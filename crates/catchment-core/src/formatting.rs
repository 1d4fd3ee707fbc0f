//! Rendering of tables for terminal and file output.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{CatchmentError, Result};
use crate::table::{Cell, Table};

/// Placeholder printed for a missing cell in text output.
pub const MISSING_MARKER: &str = "-";

/// Output format understood by [`render_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CatchmentError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(CatchmentError::Config(format!(
                "unknown output format \"{}\"",
                other
            ))),
        }
    }
}

/// Format a single cell with a fixed number of decimal places.
///
/// # Examples
///
/// ```
/// use catchment_core::formatting::format_cell;
///
/// assert_eq!(format_cell(Some(1.5), 2), "1.50");
/// assert_eq!(format_cell(Some(-3.0), 0), "-3");
/// assert_eq!(format_cell(None, 2), "-");
/// ```
pub fn format_cell(cell: Cell, decimals: usize) -> String {
    match cell {
        Some(v) => format!("{:.prec$}", v, prec = decimals),
        None => MISSING_MARKER.to_string(),
    }
}

/// Render `table` in the requested format.
pub fn render_table<K>(table: &Table<K>, format: OutputFormat, decimals: usize) -> Result<String>
where
    K: Display + serde::Serialize,
{
    match format {
        OutputFormat::Text => Ok(render_text(table, decimals)),
        OutputFormat::Csv => render_csv(table),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(table)?),
    }
}

/// Right-aligned columns under a header line; the index is left-aligned.
pub fn render_text<K: Display>(table: &Table<K>, decimals: usize) -> String {
    let keys: Vec<String> = table.index().iter().map(|k| k.to_string()).collect();
    let body: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|c| format_cell(*c, decimals)).collect())
        .collect();

    let key_width = keys.iter().map(|k| k.len()).max().unwrap_or(0);
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            body.iter()
                .map(|row| row[i].len())
                .max()
                .unwrap_or(0)
                .max(label.len())
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(key_width));
    for (label, width) in table.columns().iter().zip(&widths) {
        out.push_str(&format!("  {:>w$}", label, w = width));
    }
    out.push('\n');

    for (key, row) in keys.iter().zip(&body) {
        out.push_str(&format!("{:<w$}", key, w = key_width));
        for (cell, width) in row.iter().zip(&widths) {
            out.push_str(&format!("  {:>w$}", cell, w = width));
        }
        out.push('\n');
    }
    out
}

/// Comma-separated output with an `index` header column; missing cells are
/// empty fields and labels are quoted where needed.
pub fn render_csv<K: Display>(table: &Table<K>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let header = std::iter::once("index").chain(table.columns().iter().map(String::as_str));
    writer.write_record(header)?;

    for (key, row) in table.iter() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(key.to_string());
        record.extend(row.iter().map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()));
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CatchmentError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| CatchmentError::Other(e.into()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
