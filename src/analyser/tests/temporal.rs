use super::{classes_of, customs_frame};
use crate::analyser::temporal::{parse_timestamp, temporal_trend};
use crate::error::DouaneError;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn test_parse_timestamp_formats() {
    assert_eq!(parse_timestamp("2024-03-05"), Some(day(2024, 3, 5)));
    // Slash dates are day first
    assert_eq!(parse_timestamp("05/03/2024"), Some(day(2024, 3, 5)));
    assert_eq!(parse_timestamp("31/01/2024"), Some(day(2024, 1, 31)));
    assert_eq!(parse_timestamp("01/31/2024"), None);
    assert_eq!(parse_timestamp(" 2024/03/05 "), Some(day(2024, 3, 5)));
    assert_eq!(parse_timestamp("2024-03"), Some(day(2024, 3, 1)));
    assert_eq!(parse_timestamp("03/2024"), Some(day(2024, 3, 1)));
    assert_eq!(
        parse_timestamp("2024-03-05 14:30:00"),
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(14, 30, 0)
    );
    assert_eq!(parse_timestamp("bad"), None);
    assert_eq!(parse_timestamp(""), None);
}

#[test]
fn test_trend_sorted_and_drops_bad_rows() -> Result<()> {
    let df = df!(
        "DATE" => &["2024-03-05", "bad", "2024-01-10"],
        "VALEUR" => &[10.0, 99.0, 5.0]
    )?;
    let trend = temporal_trend(&df, &classes_of(&df), "DATE", "VALEUR")?;

    let points: Vec<(NaiveDateTime, Option<f64>)> =
        trend.points.iter().map(|p| (p.timestamp, p.value)).collect();
    assert_eq!(
        points,
        vec![(day(2024, 1, 10), Some(5.0)), (day(2024, 3, 5), Some(10.0))]
    );
    assert_eq!(trend.dropped_rows, vec![1]);
    assert_eq!(trend.dropped(), 1);
    Ok(())
}

#[test]
fn test_trend_is_stable_for_equal_dates() -> Result<()> {
    let df = customs_frame();
    let trend = temporal_trend(&df, &classes_of(&df), "DATE", "TONNAGE")?;

    assert_eq!(trend.points.len(), 5);
    assert_eq!(trend.dropped_rows, vec![3]);
    // Both 2021-03-01 rows, in table order
    assert_eq!(trend.points[0].value, Some(75.5));
    assert_eq!(trend.points[1].value, Some(64.0));
    assert!(trend.points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    Ok(())
}

#[test]
fn test_trend_keeps_missing_values() -> Result<()> {
    let df = df!(
        "DATE" => &["2024-01-01", "2024-02-01"],
        "VALEUR" => &[Some(1.0), None]
    )?;
    let trend = temporal_trend(&df, &classes_of(&df), "DATE", "VALEUR")?;
    assert_eq!(trend.points.len(), 2);
    assert_eq!(trend.points[1].value, None);
    Ok(())
}

#[test]
fn test_trend_native_date_column() -> Result<()> {
    let jour = Series::new("jour".into(), vec![Some(19_800i32), None, Some(19_700)])
        .cast(&DataType::Date)?;
    let valeur = Series::new("VALEUR".into(), vec![1.0, 2.0, 3.0]);
    let df = DataFrame::new(vec![Column::from(jour), Column::from(valeur)])?;

    let trend = temporal_trend(&df, &classes_of(&df), "jour", "VALEUR")?;
    assert_eq!(trend.points.len(), 2);
    assert_eq!(trend.points[0].value, Some(3.0));
    assert_eq!(trend.dropped_rows, vec![1]);
    Ok(())
}

#[test]
fn test_trend_no_parseable_dates() {
    let df = df!("DATE" => &["n/a", "bad"], "VALEUR" => &[1.0, 2.0]).unwrap();
    let err = temporal_trend(&df, &classes_of(&df), "DATE", "VALEUR").unwrap_err();
    assert!(matches!(err, DouaneError::Column { ref column, .. } if column == "DATE"));
}

#[test]
fn test_trend_requires_numeric_value() {
    let df = customs_frame();
    let classes = classes_of(&df);

    let err = temporal_trend(&df, &classes, "DATE", "ZONE").unwrap_err();
    assert!(matches!(err, DouaneError::Column { ref column, .. } if column == "ZONE"));

    let err = temporal_trend(&df, &classes, "JOUR", "TONNAGE").unwrap_err();
    assert!(matches!(err, DouaneError::Column { ref column, .. } if column == "JOUR"));
}
