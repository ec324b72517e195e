//! Statistical views over one table.
//!
//! - [`describe`]: count/mean/std/quartiles for every numeric column
//! - [`numeric_distribution`]: equal-width histogram plus box summary with IQR fences
//! - [`categorical_frequency`]: value counts, most frequent first
//! - [`grouped_totals`]: numeric totals per category value
//!
//! Column kinds come from a [`ColumnClassification`] computed once by the
//! caller; nothing here re-inspects dtypes to decide what a column is.

use super::types::{
    BoxSummary, ColumnClassification, ColumnDescription, ColumnKind, DescribeStats, Description,
    HistogramBin, NumericDistribution,
};
use crate::error::{DouaneError, Result};
use polars::prelude::*;
use std::collections::HashMap;

/// Look up a column and check that it has the kind a view needs.
fn expect_kind<'a>(
    df: &'a DataFrame,
    classes: &ColumnClassification,
    name: &str,
    wanted: ColumnKind,
) -> Result<&'a Series> {
    match classes.kind_of(name) {
        Some(kind) if kind == wanted => {}
        Some(kind) => {
            return Err(DouaneError::column(
                name,
                format!("expected a {} column, found {}", wanted.as_str(), kind.as_str()),
            ));
        }
        None => return Err(DouaneError::column(name, "no such column")),
    }
    let col = df
        .column(name)
        .map_err(|e| DouaneError::column(name, e.to_string()))?;
    Ok(col.as_materialized_series())
}

fn as_f64(series: &Series) -> Result<Float64Chunked> {
    Ok(series.cast(&DataType::Float64)?.f64()?.clone())
}

fn quantile(ca: &Float64Chunked, q: f64) -> f64 {
    ca.quantile(q, QuantileMethod::Linear)
        .ok()
        .flatten()
        .unwrap_or(f64::NAN)
}

pub fn describe_column(ca: &Float64Chunked) -> DescribeStats {
    let count = ca.len() - ca.null_count();
    if count == 0 {
        return DescribeStats::undefined();
    }

    DescribeStats {
        count,
        mean: ca.mean().unwrap_or(f64::NAN),
        std: if count > 1 {
            ca.std(1).unwrap_or(f64::NAN)
        } else {
            f64::NAN
        },
        min: ca.min().unwrap_or(f64::NAN),
        q1: quantile(ca, 0.25),
        median: ca.median().unwrap_or(f64::NAN),
        q3: quantile(ca, 0.75),
        max: ca.max().unwrap_or(f64::NAN),
    }
}

/// Descriptive statistics for every numeric column. Empty when there are none.
///
/// # Errors
///
/// `DataProcessing` if a numeric column cannot be read as floats.
pub fn describe(df: &DataFrame, classes: &ColumnClassification) -> Result<Description> {
    let mut columns = Vec::new();
    for name in classes.numeric_columns() {
        let series = expect_kind(df, classes, name, ColumnKind::Numeric)?;
        columns.push(ColumnDescription {
            name: name.to_owned(),
            stats: describe_column(&as_f64(series)?),
        });
    }
    Ok(Description { columns })
}

/// Equal-width bins over `[min, max]`; the last bin also holds `max`.
pub fn calculate_histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(min_v), Some(max_v)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    // Single value: one bin holds everything.
    if (max_v - min_v).abs() < f64::EPSILON || bins <= 1 {
        return vec![HistogramBin {
            lower: min_v,
            upper: max_v,
            count: values.len(),
        }];
    }

    let bin_width = (max_v - min_v) / bins as f64;
    let mut counts = vec![0; bins];
    for val in values {
        let idx = (((val - min_v) / bin_width).floor() as usize).min(bins - 1);
        if let Some(count) = counts.get_mut(idx) {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min_v + i as f64 * bin_width,
            upper: if i == bins - 1 {
                max_v
            } else {
                min_v + (i + 1) as f64 * bin_width
            },
            count,
        })
        .collect()
}

pub fn calculate_box_summary(ca: &Float64Chunked) -> BoxSummary {
    let stats = describe_column(ca);
    let iqr = stats.q3 - stats.q1;
    let lower_fence = stats.q1 - 1.5 * iqr;
    let upper_fence = stats.q3 + 1.5 * iqr;
    let outliers = ca
        .into_iter()
        .flatten()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    BoxSummary {
        min: stats.min,
        q1: stats.q1,
        median: stats.median,
        q3: stats.q3,
        max: stats.max,
        lower_fence,
        upper_fence,
        outliers,
    }
}

/// Histogram and box plot data for one numeric column.
///
/// An all-missing column yields no bins and NaN box statistics.
///
/// # Errors
///
/// `Column` if the column is absent or not numeric.
pub fn numeric_distribution(
    df: &DataFrame,
    classes: &ColumnClassification,
    column: &str,
    bins: usize,
) -> Result<NumericDistribution> {
    let series = expect_kind(df, classes, column, ColumnKind::Numeric)?;
    let ca = as_f64(series)?;
    let values: Vec<f64> = ca.into_iter().flatten().filter(|v| !v.is_nan()).collect();

    Ok(NumericDistribution {
        column: column.to_owned(),
        bins: calculate_histogram(&values, bins),
        box_summary: calculate_box_summary(&ca),
    })
}

/// Value counts, most frequent first; ties keep first-seen order. Nulls are skipped.
///
/// # Errors
///
/// `Column` if the column is absent or not categorical.
pub fn categorical_frequency(
    df: &DataFrame,
    classes: &ColumnClassification,
    column: &str,
) -> Result<Vec<(String, usize)>> {
    let series = expect_kind(df, classes, column, ColumnKind::Categorical)?;
    let ca = series.str()?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in ca.into_iter().flatten() {
        if let Some(&pos) = index.get(value) {
            if let Some(entry) = counts.get_mut(pos) {
                entry.1 += 1;
            }
        } else {
            index.insert(value, counts.len());
            counts.push((value.to_owned(), 1));
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

/// Sum of a numeric column per value of a categorical column, largest total first.
///
/// Rows with a null category are skipped; null values count as zero.
///
/// # Errors
///
/// `Column` if either column is absent or of the wrong kind.
pub fn grouped_totals(
    df: &DataFrame,
    classes: &ColumnClassification,
    category_column: &str,
    value_column: &str,
) -> Result<Vec<(String, f64)>> {
    let categories = expect_kind(df, classes, category_column, ColumnKind::Categorical)?.str()?;
    let values = as_f64(expect_kind(df, classes, value_column, ColumnKind::Numeric)?)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();
    for (category, value) in categories.into_iter().zip(&values) {
        let Some(category) = category else {
            continue;
        };
        let value = value.filter(|v| !v.is_nan()).unwrap_or(0.0);
        if let Some(&pos) = index.get(category) {
            if let Some(entry) = totals.get_mut(pos) {
                entry.1 += value;
            }
        } else {
            index.insert(category, totals.len());
            totals.push((category.to_owned(), value));
        }
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(totals)
}
