use std::io::Write;

use catchment_data::analysis::{analyze_file, AnalysisOptions, DerivedTable};
use catchment_data::core::error::CatchmentError;
use catchment_data::core::models::{EmptyBucketPolicy, RecordSchema, Reduction, Statistic};
use chrono::NaiveDate;
use tempfile::NamedTempFile;

const EXPORT: &str = "\
Site,Date,Rainfall (mm)
FP35,01/12/2008 09:00,0.5
FP35,01/12/2008 21:00,1.5
PL23,01/12/2008 09:00,2
FP35,02/12/2008 03:00,4
PL23,02/12/2008 15:00,
PL23,03/12/2008 00:00,6
";

fn export_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(text.as_bytes()).expect("write");
    file
}

fn options(statistic: Statistic) -> AnalysisOptions {
    AnalysisOptions {
        statistic,
        ..AnalysisOptions::default()
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2008, 12, day).unwrap()
}

#[test]
fn daily_reductions_from_file() {
    let file = export_file(EXPORT);

    let cases = [
        (Reduction::Total, [Some(2.0), Some(4.0), Some(0.0)], [Some(2.0), Some(0.0), Some(6.0)]),
        (Reduction::Mean, [Some(1.0), Some(4.0), None], [Some(2.0), None, Some(6.0)]),
        (Reduction::Max, [Some(1.5), Some(4.0), None], [Some(2.0), None, Some(6.0)]),
        (Reduction::Min, [Some(0.5), Some(4.0), None], [Some(2.0), None, Some(6.0)]),
    ];

    for (reduction, fp35, pl23) in cases {
        let result = analyze_file(file.path(), &options(Statistic::Daily(reduction))).unwrap();
        let DerivedTable::Daily(table) = result.table else {
            panic!("expected a daily table");
        };

        assert_eq!(table.index(), &[date(1), date(2), date(3)]);
        assert_eq!(table.column("FP35").unwrap(), fp35.to_vec(), "{:?}", reduction);
        assert_eq!(table.column("PL23").unwrap(), pl23.to_vec(), "{:?}", reduction);
    }
}

#[test]
fn metadata_records_source_and_counts() {
    let file = export_file(EXPORT);
    let result = analyze_file(file.path(), &options(Statistic::Daily(Reduction::Total))).unwrap();

    let meta = &result.metadata;
    assert_eq!(meta.source.as_deref(), Some(file.path().display().to_string().as_str()));
    assert_eq!(meta.records_read, 6);
    assert_eq!(meta.sites, 2);
    assert_eq!(meta.rows_in, 5);
    assert_eq!(meta.rows_out, 3);
}

#[test]
fn normalise_from_file() {
    let file = export_file(EXPORT);
    let result = analyze_file(file.path(), &options(Statistic::Normalise)).unwrap();
    let DerivedTable::Normalised(table) = result.table else {
        panic!("expected a normalised table");
    };

    assert_eq!(table.n_rows(), 5);
    assert_eq!(
        table.column("FP35").unwrap(),
        vec![Some(0.125), Some(0.375), Some(1.0), None, None]
    );
}

#[test]
fn missing_measurement_column_is_schema_error() {
    let file = export_file(EXPORT);
    let opts = AnalysisOptions {
        schema: RecordSchema::for_measurement("River Level (m)"),
        ..AnalysisOptions::default()
    };
    let err = analyze_file(file.path(), &opts).unwrap_err();
    assert!(matches!(err, CatchmentError::Schema(_)));
}

#[test]
fn fail_policy_surfaces_empty_day() {
    let file = export_file(EXPORT);
    let opts = AnalysisOptions {
        empty_bucket: EmptyBucketPolicy::Fail,
        ..options(Statistic::Daily(Reduction::Mean))
    };
    let err = analyze_file(file.path(), &opts).unwrap_err();
    match err {
        CatchmentError::EmptyReduction { column, date: day } => {
            assert_eq!(column, "PL23");
            assert_eq!(day, date(2));
        }
        other => panic!("expected EmptyReduction, got {other:?}"),
    }
}

#[test]
fn all_zero_site_cannot_be_normalised() {
    let file = export_file("Site,Date,Rainfall (mm)\nDRY1,01/12/2008 09:00,0\nDRY1,02/12/2008 09:00,0\n");
    let err = analyze_file(file.path(), &options(Statistic::Normalise)).unwrap_err();
    assert!(matches!(err, CatchmentError::DegenerateColumn { ref column } if column == "DRY1"));
}
