//! Reshaping of flat per-site records into a timestamp-indexed table.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use catchment_core::error::{CatchmentError, Result};
use catchment_core::models::RawRecord;
use catchment_core::table::{Cell, Table, TimeTable};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// Stateless helper that turns [`RawRecord`]s into a [`TimeTable`].
pub struct TableBuilder;

impl TableBuilder {
    /// Build a table with one row per distinct timestamp (ascending) and one
    /// column per distinct site (first-seen order).
    ///
    /// Cells with no contributing record are missing, not zero. When a
    /// `(timestamp, site)` pair occurs more than once the last record wins.
    /// A present but non-finite value fails with
    /// [`CatchmentError::MalformedInput`] at that record's index.
    pub fn build(records: &[RawRecord]) -> Result<TimeTable> {
        let mut site_order: Vec<&str> = Vec::new();
        let mut by_site: HashMap<&str, BTreeMap<NaiveDateTime, Cell>> = HashMap::new();

        for (pos, record) in records.iter().enumerate() {
            if let Some(v) = record.value {
                if !v.is_finite() {
                    return Err(CatchmentError::malformed(
                        pos,
                        format!("non-finite value {} for site \"{}\"", v, record.site_id),
                    ));
                }
            }

            let series = by_site
                .entry(record.site_id.as_str())
                .or_insert_with(|| {
                    site_order.push(record.site_id.as_str());
                    BTreeMap::new()
                });

            if series.insert(record.timestamp, record.value).is_some() {
                warn!(
                    "Duplicate record for site \"{}\" at {}; keeping the later value",
                    record.site_id, record.timestamp
                );
            }
        }

        let index: Vec<NaiveDateTime> = by_site
            .values()
            .flat_map(|series| series.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows: Vec<Vec<Cell>> = index
            .iter()
            .map(|ts| {
                site_order
                    .iter()
                    .map(|site| by_site[site].get(ts).copied().flatten())
                    .collect()
            })
            .collect();

        let columns: Vec<String> = site_order.iter().map(|s| s.to_string()).collect();

        debug!(
            "Built table with {} rows and {} sites from {} records",
            index.len(),
            columns.len(),
            records.len()
        );

        Ok(Table::new(index, columns, rows)?.sorted_by_index())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
