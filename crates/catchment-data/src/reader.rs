//! Site export loading.
//!
//! Reads the comma-separated files written by the monitoring network (one
//! header line, then one measurement per record) and converts the three
//! columns named by a [`RecordSchema`] into [`RawRecord`]s. Every other
//! column is ignored.

use std::path::Path;

use catchment_core::error::{CatchmentError, Result};
use catchment_core::models::{RawRecord, RecordSchema};
use catchment_core::time_utils::TimestampParser;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

/// Field values treated as an absent measurement (compared case-insensitively).
const MISSING_TOKENS: &[&str] = &["", "na", "nan", "null"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every record from the export at `path`.
pub fn read_records(path: &Path, schema: &RecordSchema) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| CatchmentError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(&text, schema)?;
    debug!(
        "Read {} records from {} (measurement \"{}\")",
        records.len(),
        path.display(),
        schema.value_column
    );
    Ok(records)
}

/// Parse export text already held in memory.
///
/// Fails with [`CatchmentError::Schema`] when the header is absent or lacks a
/// required column, and with [`CatchmentError::MalformedInput`] (carrying the
/// 1-based line number) for the first record whose timestamp, site or value
/// cannot be used. Quoted fields may contain commas and line breaks. Blank
/// lines are skipped.
pub fn parse_records(text: &str, schema: &RecordSchema) -> Result<Vec<RawRecord>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = reader.headers()?.clone();
    if header.iter().all(str::is_empty) {
        return Err(CatchmentError::Schema("input has no header line".to_string()));
    }

    let [date_pos, site_pos, value_pos] = locate_columns(&header, schema)?;
    let needed = date_pos.max(site_pos).max(value_pos) + 1;
    let parser = TimestampParser::new(schema.day_first);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line_no = row
            .position()
            .map_or(0, |pos| usize::try_from(pos.line()).unwrap_or(usize::MAX));

        if row.len() < needed {
            return Err(CatchmentError::malformed(
                line_no,
                format!("expected at least {} fields, found {}", needed, row.len()),
            ));
        }

        let raw_date = &row[date_pos];
        let timestamp = parser.parse(raw_date).ok_or_else(|| {
            CatchmentError::malformed(line_no, format!("cannot parse timestamp \"{}\"", raw_date))
        })?;

        let site_id = &row[site_pos];
        if site_id.is_empty() {
            return Err(CatchmentError::malformed(line_no, "empty site identifier"));
        }

        let value = parse_value(&row[value_pos])
            .map_err(|detail| CatchmentError::malformed(line_no, detail))?;

        records.push(RawRecord::new(timestamp, site_id, value));
    }

    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Find the positions of the date, site and value columns in `header`.
fn locate_columns(header: &StringRecord, schema: &RecordSchema) -> Result<[usize; 3]> {
    let mut positions = [0usize; 3];
    for (slot, name) in positions.iter_mut().zip(schema.required_columns()) {
        *slot = header.iter().position(|h| h == name).ok_or_else(|| {
            CatchmentError::Schema(format!("missing required column \"{}\"", name))
        })?;
    }
    Ok(positions)
}

/// Parse a measurement field. Missing tokens become `None`; anything else
/// must be a finite number.
fn parse_value(raw: &str) -> std::result::Result<Option<f64>, String> {
    if MISSING_TOKENS
        .iter()
        .any(|token| raw.eq_ignore_ascii_case(token))
    {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("cannot parse value \"{}\" as a number", raw)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
