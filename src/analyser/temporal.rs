//! Time-ordered trend of a numeric column against a date column.
//!
//! Rows whose date cannot be parsed are dropped, not fatal; the returned
//! [`Trend`] lists them so a dashboard can report data quality.

use super::types::{ColumnClassification, ColumnKind, Trend, TrendPoint};
use crate::error::{DouaneError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Parses the date spellings found in customs exports. Month-only values map to the 1st.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // "2024-03" and "03/2024"
    let month_first = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("01/{s}"), "%d/%m/%Y"));
    month_first.ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// One optional timestamp per row.
fn column_timestamps(series: &Series) -> Result<Vec<Option<NaiveDateTime>>> {
    let dtype = series.dtype();
    if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
        let millis = series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?;
        return Ok(millis
            .i64()?
            .into_iter()
            .map(|ms| ms.and_then(DateTime::from_timestamp_millis).map(|dt| dt.naive_utc()))
            .collect());
    }

    let text = if dtype.is_string() {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_timestamp))
        .collect())
}

/// Pair `value_column` with parsed `date_column` timestamps, sorted ascending.
///
/// # Errors
///
/// `Column` if either column is absent, the value column is not numeric, or no
/// row has a parseable date.
pub fn temporal_trend(
    df: &DataFrame,
    classes: &ColumnClassification,
    date_column: &str,
    value_column: &str,
) -> Result<Trend> {
    match classes.kind_of(value_column) {
        Some(ColumnKind::Numeric) => {}
        Some(kind) => {
            return Err(DouaneError::column(
                value_column,
                format!("trend values must be Numeric, found {}", kind.as_str()),
            ));
        }
        None => return Err(DouaneError::column(value_column, "no such column")),
    }
    if classes.get(date_column).is_none() {
        return Err(DouaneError::column(date_column, "no such column"));
    }

    let dates = column_timestamps(df.column(date_column)?.as_materialized_series())?;
    let values = df
        .column(value_column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = values.f64()?;

    let mut points = Vec::with_capacity(dates.len());
    let mut dropped_rows = Vec::new();
    for (row, (date, value)) in dates.into_iter().zip(values).enumerate() {
        match date {
            Some(timestamp) => points.push(TrendPoint { timestamp, value }),
            None => dropped_rows.push(row),
        }
    }

    if points.is_empty() {
        return Err(DouaneError::column(
            date_column,
            format!("no parseable dates ({} rows dropped)", dropped_rows.len()),
        ));
    }
    if !dropped_rows.is_empty() {
        log::debug!(
            "Trend of '{value_column}' over '{date_column}' dropped {} unparseable rows",
            dropped_rows.len()
        );
    }

    // Stable: rows sharing a timestamp keep table order.
    points.sort_by_key(|p| p.timestamp);

    Ok(Trend {
        date_column: date_column.to_owned(),
        value_column: value_column.to_owned(),
        points,
        dropped_rows,
    })
}
