//! The in-memory table shared by every stage of the pipeline.
//!
//! Rows are keyed by a unique, ordered index (timestamps for freshly built
//! tables, calendar dates for daily summaries) and columns by unique site
//! labels. Cells are stored row-major as [`Cell`]s.

use std::collections::{BTreeSet, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{CatchmentError, Result};

/// One table cell. `None` is a missing measurement, never the same as `0.0`.
pub type Cell = Option<f64>;

/// Table indexed by measurement timestamp.
pub type TimeTable = Table<NaiveDateTime>;

/// Table indexed by calendar date, as produced by the daily reductions.
pub type DailyTable = Table<NaiveDate>;

// ── Table ─────────────────────────────────────────────────────────────────────

/// A 2D table with a unique row index and unique column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table<K> {
    index: Vec<K>,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl<K> Default for Table<K> {
    fn default() -> Self {
        Self {
            index: Vec::new(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<K: Ord> Table<K> {
    /// Assemble a table, checking every structural invariant.
    ///
    /// Fails with [`CatchmentError::InvalidTable`] when `rows` does not match
    /// `index` in length, a row does not have one cell per column, a present
    /// cell is NaN or infinite, or either the index or the labels contain
    /// duplicates.
    pub fn new(index: Vec<K>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if index.len() != rows.len() {
            return Err(CatchmentError::InvalidTable(format!(
                "{} index entries but {} rows",
                index.len(),
                rows.len()
            )));
        }
        if let Some((pos, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(CatchmentError::InvalidTable(format!(
                "row {} has {} cells, expected {}",
                pos,
                row.len(),
                columns.len()
            )));
        }

        for (pos, row) in rows.iter().enumerate() {
            if let Some((col, v)) = row
                .iter()
                .enumerate()
                .find_map(|(col, cell)| (*cell).filter(|v| !v.is_finite()).map(|v| (col, v)))
            {
                return Err(CatchmentError::InvalidTable(format!(
                    "non-finite value {} at row {}, column \"{}\"",
                    v, pos, columns[col]
                )));
            }
        }

        let mut labels = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !labels.insert(c.as_str())) {
            return Err(CatchmentError::InvalidTable(format!(
                "duplicate column label \"{}\"",
                dup
            )));
        }

        let mut keys = BTreeSet::new();
        if let Some(pos) = index.iter().position(|k| !keys.insert(k)) {
            return Err(CatchmentError::InvalidTable(format!(
                "duplicate index entry at row {}",
                pos
            )));
        }

        Ok(Self {
            index,
            columns,
            rows,
        })
    }

    /// Like [`Table::new`] for fully populated data; every value becomes `Some`.
    pub fn from_values<S: Into<String>>(
        index: Vec<K>,
        columns: Vec<S>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let columns = columns.into_iter().map(Into::into).collect();
        let rows = values
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect();
        Self::new(index, columns, rows)
    }

    /// Return the same table with its rows ordered by ascending index.
    pub fn sorted_by_index(self) -> Self {
        let Self {
            index,
            columns,
            rows,
        } = self;

        let mut paired: Vec<(K, Vec<Cell>)> = index.into_iter().zip(rows).collect();
        paired.sort_by(|a, b| a.0.cmp(&b.0));
        let (index, rows) = paired.into_iter().unzip();

        Self {
            index,
            columns,
            rows,
        }
    }
}

impl<K> Table<K> {
    /// Row index, in row order.
    pub fn index(&self) -> &[K] {
        &self.index
    }

    /// Column labels, in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows; each has exactly [`Table::n_columns`] cells.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Position of `label` among the columns.
    pub fn column_position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Copy out a single column in row order.
    pub fn column(&self, label: &str) -> Option<Vec<Cell>> {
        let pos = self.column_position(label)?;
        Some(self.rows.iter().map(|row| row[pos]).collect())
    }

    /// Iterate `(key, row)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[Cell])> {
        self.index
            .iter()
            .zip(self.rows.iter().map(|row| row.as_slice()))
    }
}

impl<K: PartialEq> Table<K> {
    /// Look up the cell at `(key, label)`.
    ///
    /// Returns `None` when the row or column does not exist, and `Some(None)`
    /// for an existing but missing cell.
    pub fn cell(&self, key: &K, label: &str) -> Option<Cell> {
        let col = self.column_position(label)?;
        let row = self.index.iter().position(|k| k == key)?;
        Some(self.rows[row][col])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
