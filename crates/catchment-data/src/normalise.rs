//! Column-wise rescaling against each column's maximum.

use catchment_core::error::{CatchmentError, Result};
use catchment_core::table::{Cell, Table};
use tracing::debug;

/// Maximum of every column over its non-missing cells, in column order.
///
/// A column with no values yields `None`.
pub fn column_maxima<K>(table: &Table<K>) -> Vec<Cell> {
    let mut maxima: Vec<Cell> = vec![None; table.n_columns()];
    for row in table.rows() {
        for (max, cell) in maxima.iter_mut().zip(row) {
            if let Some(v) = *cell {
                *max = Some(max.map_or(v, |m| m.max(v)));
            }
        }
    }
    maxima
}

/// Divide every cell by the maximum of its column.
///
/// Row index, labels and their order are preserved; missing cells stay
/// missing. Every divisor is checked before any division happens, and a
/// column whose maximum is zero, or which has no values, fails with
/// [`CatchmentError::DegenerateColumn`]. A quotient outside the `f64` range
/// fails with [`CatchmentError::InvalidTable`].
pub fn normalise<K: Ord + Clone>(table: &Table<K>) -> Result<Table<K>> {
    let divisors: Vec<f64> = table
        .columns()
        .iter()
        .zip(column_maxima(table))
        .map(|(label, max)| match max {
            Some(m) if m != 0.0 => Ok(m),
            _ => Err(CatchmentError::DegenerateColumn {
                column: label.clone(),
            }),
        })
        .collect::<Result<_>>()?;

    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(&divisors)
                .map(|(cell, d)| cell.map(|v| v / d))
                .collect()
        })
        .collect();

    debug!(
        "Normalised {} rows across {} columns",
        table.n_rows(),
        table.n_columns()
    );

    Table::new(table.index().to_vec(), table.columns().to_vec(), rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
