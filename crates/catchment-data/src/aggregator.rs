//! Daily reductions over a timestamp-indexed table.
//!
//! Rows are grouped by the calendar date of their timestamp and every column
//! is reduced independently within each group.

use std::collections::BTreeMap;

use catchment_core::error::{CatchmentError, Result};
use catchment_core::models::{EmptyBucketPolicy, Reduction};
use catchment_core::table::{Cell, DailyTable, Table, TimeTable};
use catchment_core::time_utils::calendar_date;
use chrono::NaiveDate;
use tracing::debug;

// ── Daily bucketing ───────────────────────────────────────────────────────────

/// Group the row positions of `table` by calendar date, dates ascending.
///
/// Within a bucket, positions are ordered by timestamp rather than by row
/// position, so the reductions see the same sequence however the input rows
/// were ordered.
pub fn bucket_by_date(table: &TimeTable) -> BTreeMap<NaiveDate, Vec<usize>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (pos, ts) in table.index().iter().enumerate() {
        buckets.entry(calendar_date(ts)).or_default().push(pos);
    }
    for positions in buckets.values_mut() {
        positions.sort_by_key(|&pos| table.index()[pos]);
    }
    buckets
}

/// Reduce the non-missing `values` of one column within one bucket.
///
/// Total is `0.0` for an empty bucket; mean, max and min are `None`.
pub fn reduce_values(values: impl IntoIterator<Item = f64>, reduction: Reduction) -> Cell {
    let mut values = values.into_iter();
    match reduction {
        Reduction::Total => Some(values.fold(0.0, |acc, v| acc + v)),
        Reduction::Mean => {
            let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            (count > 0).then(|| sum / count as f64)
        }
        Reduction::Max => values.next().map(|first| values.fold(first, f64::max)),
        Reduction::Min => values.next().map(|first| values.fold(first, f64::min)),
    }
}

// ── DailyAggregator ───────────────────────────────────────────────────────────

/// Computes daily total/mean/max/min tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyAggregator {
    policy: EmptyBucketPolicy,
}

impl DailyAggregator {
    pub fn new(policy: EmptyBucketPolicy) -> Self {
        Self { policy }
    }

    /// Daily sum of each column; days without values sum to `0.0`.
    pub fn daily_total(&self, table: &TimeTable) -> Result<DailyTable> {
        self.aggregate(table, Reduction::Total)
    }

    /// Daily arithmetic mean of each column.
    pub fn daily_mean(&self, table: &TimeTable) -> Result<DailyTable> {
        self.aggregate(table, Reduction::Mean)
    }

    /// Daily maximum of each column.
    pub fn daily_max(&self, table: &TimeTable) -> Result<DailyTable> {
        self.aggregate(table, Reduction::Max)
    }

    /// Daily minimum of each column.
    pub fn daily_min(&self, table: &TimeTable) -> Result<DailyTable> {
        self.aggregate(table, Reduction::Min)
    }

    /// Bucket `table` by calendar date and apply `reduction` to every column.
    ///
    /// The output has one row per distinct date (ascending) and the input's
    /// columns in the input's order. Under [`EmptyBucketPolicy::Fail`] a
    /// mean/max/min bucket with no values aborts with
    /// [`CatchmentError::EmptyReduction`]. A total or mean that leaves the
    /// `f64` range fails with [`CatchmentError::Overflow`].
    pub fn aggregate(&self, table: &TimeTable, reduction: Reduction) -> Result<DailyTable> {
        let buckets = bucket_by_date(table);
        let rows_in = table.rows();

        let mut index = Vec::with_capacity(buckets.len());
        let mut rows = Vec::with_capacity(buckets.len());

        for (date, positions) in buckets {
            let row = table
                .columns()
                .iter()
                .enumerate()
                .map(|(col, label)| {
                    let values = positions.iter().filter_map(|&pos| rows_in[pos][col]);
                    match reduce_values(values, reduction) {
                        None if self.policy == EmptyBucketPolicy::Fail => {
                            Err(CatchmentError::EmptyReduction {
                                column: label.clone(),
                                date,
                            })
                        }
                        Some(v) if !v.is_finite() => Err(CatchmentError::Overflow {
                            column: label.clone(),
                            date,
                            reduction: reduction.as_str().to_string(),
                        }),
                        cell => Ok(cell),
                    }
                })
                .collect::<Result<Vec<Cell>>>()?;

            index.push(date);
            rows.push(row);
        }

        debug!(
            "Daily {}: {} rows reduced to {} days",
            reduction.as_str(),
            table.n_rows(),
            index.len()
        );

        Table::new(index, table.columns().to_vec(), rows)
    }
}

// ── Convenience functions ─────────────────────────────────────────────────────

/// [`DailyAggregator::daily_total`] with the default policy.
pub fn daily_total(table: &TimeTable) -> Result<DailyTable> {
    DailyAggregator::default().daily_total(table)
}

/// [`DailyAggregator::daily_mean`] with the default policy.
pub fn daily_mean(table: &TimeTable) -> Result<DailyTable> {
    DailyAggregator::default().daily_mean(table)
}

/// [`DailyAggregator::daily_max`] with the default policy.
pub fn daily_max(table: &TimeTable) -> Result<DailyTable> {
    DailyAggregator::default().daily_max(table)
}

/// [`DailyAggregator::daily_min`] with the default policy.
pub fn daily_min(table: &TimeTable) -> Result<DailyTable> {
    DailyAggregator::default().daily_min(table)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, d).unwrap()
    }

    /// Three readings on 2000-01-01 at 01:00, 02:00 and 03:00.
    fn same_day(columns: &[&str], values: Vec<Vec<f64>>) -> TimeTable {
        Table::from_values(
            vec![at(1, 1), at(1, 2), at(1, 3)],
            columns.to_vec(),
            values,
        )
        .unwrap()
    }

    fn expected(columns: &[&str], values: Vec<Vec<f64>>) -> DailyTable {
        Table::from_values(vec![day(1)], columns.to_vec(), values).unwrap()
    }

    // ── fixtures ──────────────────────────────────────────────────────────────

    #[test]
    fn test_daily_mean_zeros() {
        let table = same_day(&["A", "B"], vec![vec![0.0, 0.0]; 3]);
        assert_eq!(
            daily_mean(&table).unwrap(),
            expected(&["A", "B"], vec![vec![0.0, 0.0]])
        );
    }

    #[test]
    fn test_daily_mean_integers() {
        let table = same_day(
            &["A", "B"],
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
        );
        assert_eq!(
            daily_mean(&table).unwrap(),
            expected(&["A", "B"], vec![vec![3.0, 4.0]])
        );
    }

    #[test]
    fn test_daily_total() {
        let table = same_day(
            &["A", "B", "C"],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]],
        );
        assert_eq!(
            daily_total(&table).unwrap(),
            expected(&["A", "B", "C"], vec![vec![12.0, 15.0, 18.0]])
        );
    }

    #[test]
    fn test_daily_max_is_true_maximum() {
        let table = same_day(
            &["C", "D"],
            vec![vec![2.0, 4.0], vec![6.0, 8.0], vec![10.0, 12.0]],
        );
        assert_eq!(
            daily_max(&table).unwrap(),
            expected(&["C", "D"], vec![vec![10.0, 12.0]])
        );
    }

    #[test]
    fn test_daily_min_with_negatives() {
        let table = same_day(
            &["C", "D"],
            vec![vec![1.0, -3.0], vec![5.0, -7.0], vec![-9.0, 11.0]],
        );
        assert_eq!(
            daily_min(&table).unwrap(),
            expected(&["C", "D"], vec![vec![-9.0, -7.0]])
        );
    }

    // ── bucketing ─────────────────────────────────────────────────────────────

    #[test]
    fn test_buckets_ascending_dates() {
        let table = Table::from_values(
            vec![at(3, 1), at(1, 23), at(1, 0), at(2, 12)],
            vec!["A"],
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        )
        .unwrap();

        let totals = daily_total(&table).unwrap();
        assert_eq!(totals.index(), &[day(1), day(2), day(3)]);
        assert_eq!(
            totals.column("A").unwrap(),
            vec![Some(5.0), Some(4.0), Some(1.0)]
        );
    }

    #[test]
    fn test_bucket_by_date_orders_positions_by_time() {
        let table = Table::from_values(
            vec![at(1, 5), at(2, 1), at(1, 2)],
            vec!["A"],
            vec![vec![1.0], vec![2.0], vec![3.0]],
        )
        .unwrap();

        let buckets = bucket_by_date(&table);
        assert_eq!(buckets[&day(1)], vec![2, 0]);
        assert_eq!(buckets[&day(2)], vec![1]);
    }

    #[test]
    fn test_permutations_give_identical_results() {
        let index = vec![at(1, 1), at(1, 7), at(2, 3), at(2, 9), at(2, 22), at(4, 0)];
        let values = vec![
            vec![Some(0.1), None],
            vec![Some(0.7), Some(3.5)],
            vec![Some(1.3), Some(-2.0)],
            vec![None, Some(0.25)],
            vec![Some(2.9), Some(1.0)],
            vec![Some(0.3), None],
        ];
        let columns = vec!["A".to_string(), "B".to_string()];
        let base = Table::new(index.clone(), columns.clone(), values.clone()).unwrap();

        for shift in 1..index.len() {
            let mut idx = index.clone();
            let mut vals = values.clone();
            idx.rotate_left(shift);
            vals.rotate_left(shift);
            idx.reverse();
            vals.reverse();
            let permuted = Table::new(idx, columns.clone(), vals).unwrap();

            for reduction in [Reduction::Total, Reduction::Mean, Reduction::Max, Reduction::Min] {
                let agg = DailyAggregator::default();
                assert_eq!(
                    agg.aggregate(&base, reduction).unwrap(),
                    agg.aggregate(&permuted, reduction).unwrap(),
                    "{:?} differs after shift {}",
                    reduction,
                    shift
                );
            }
        }
    }

    // ── missing values ────────────────────────────────────────────────────────

    fn with_gap() -> TimeTable {
        Table::new(
            vec![at(1, 1), at(1, 2), at(2, 1)],
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec![Some(1.0), None],
                vec![Some(3.0), None],
                vec![None, Some(4.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_total_of_empty_bucket_is_zero() {
        let totals = daily_total(&with_gap()).unwrap();
        assert_eq!(totals.cell(&day(1), "B"), Some(Some(0.0)));
        assert_eq!(totals.cell(&day(2), "A"), Some(Some(0.0)));
        assert_eq!(totals.cell(&day(1), "A"), Some(Some(4.0)));
    }

    #[test]
    fn test_mean_max_min_of_empty_bucket_is_missing() {
        let table = with_gap();
        for result in [daily_mean(&table), daily_max(&table), daily_min(&table)] {
            let out = result.unwrap();
            assert_eq!(out.cell(&day(1), "B"), Some(None));
            assert_eq!(out.cell(&day(2), "B"), Some(Some(4.0)));
        }
    }

    #[test]
    fn test_mean_ignores_missing() {
        let means = daily_mean(&with_gap()).unwrap();
        assert_eq!(means.cell(&day(1), "A"), Some(Some(2.0)));
    }

    #[test]
    fn test_fail_policy_names_column_and_date() {
        let agg = DailyAggregator::new(EmptyBucketPolicy::Fail);
        let err = agg.daily_max(&with_gap()).unwrap_err();
        match err {
            CatchmentError::EmptyReduction { column, date } => {
                assert_eq!(column, "B");
                assert_eq!(date, day(1));
            }
            other => panic!("expected EmptyReduction, got {other:?}"),
        }
    }

    #[test]
    fn test_fail_policy_does_not_affect_total() {
        let agg = DailyAggregator::new(EmptyBucketPolicy::Fail);
        assert!(agg.daily_total(&with_gap()).is_ok());
    }

    #[test]
    fn test_total_out_of_range_is_an_error() {
        let table = same_day(
            &["A", "B"],
            vec![vec![1e308, 1.0], vec![1e308, 2.0], vec![0.0, 3.0]],
        );
        for result in [daily_total(&table), daily_mean(&table)] {
            match result.unwrap_err() {
                CatchmentError::Overflow { column, date, .. } => {
                    assert_eq!(column, "A");
                    assert_eq!(date, day(1));
                }
                other => panic!("expected Overflow, got {other:?}"),
            }
        }
        assert_eq!(
            daily_max(&table).unwrap(),
            expected(&["A", "B"], vec![vec![1e308, 3.0]])
        );
    }

    #[test]
    fn test_empty_table() {
        let out = daily_mean(&TimeTable::default()).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.n_columns(), 0);
    }

    #[test]
    fn test_input_is_unchanged() {
        let table = with_gap();
        let before = table.clone();
        let _ = daily_total(&table).unwrap();
        assert_eq!(table, before);
    }

    // ── reduce_values ─────────────────────────────────────────────────────────

    #[test]
    fn test_reduce_values() {
        let v = [2.0, -1.0, 5.0];
        assert_eq!(reduce_values(v, Reduction::Total), Some(6.0));
        assert_eq!(reduce_values(v, Reduction::Mean), Some(2.0));
        assert_eq!(reduce_values(v, Reduction::Max), Some(5.0));
        assert_eq!(reduce_values(v, Reduction::Min), Some(-1.0));
        assert_eq!(reduce_values(Vec::new(), Reduction::Total), Some(0.0));
        assert_eq!(reduce_values(Vec::new(), Reduction::Mean), None);
    }
}
