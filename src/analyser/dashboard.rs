//! One-call dashboard summary of a loaded table.
//!
//! Composes classification, description and the three chart views the way the
//! customs dashboard lays them out. Missing column kinds simply leave a view
//! empty; a failing trend is reported inside the result instead of failing the
//! whole summary.

use super::classify::classify_columns;
use super::profiling::{categorical_frequency, describe, numeric_distribution};
use super::temporal::temporal_trend;
use super::types::{ColumnClass, ColumnClassification, Description, NumericDistribution, Trend};
use crate::config::{CatalogConfig, default_date_hints};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Which columns to chart. `None` picks the first eligible column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    pub date_hints: Vec<String>,
    pub histogram_bins: usize,
    pub numeric_column: Option<String>,
    pub categorical_column: Option<String>,
    pub date_column: Option<String>,
    pub value_column: Option<String>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            date_hints: default_date_hints(),
            histogram_bins: 20,
            numeric_column: None,
            categorical_column: None,
            date_column: None,
            value_column: None,
        }
    }
}

impl DashboardOptions {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            date_hints: config.date_hints.clone(),
            histogram_bins: config.histogram_bins,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub class: ColumnClass,
    pub nulls: usize,
    pub distinct: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrendView {
    /// No date-like column, or no numeric column to plot against it.
    NotApplicable,
    Available(Trend),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnOverview>,
    pub classification: ColumnClassification,
    pub description: Description,
    pub distribution: Option<NumericDistribution>,
    pub frequency: Option<(String, Vec<(String, usize)>)>,
    pub trend: TrendView,
}

fn pick<'a>(chosen: Option<&'a str>, mut candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    chosen.or_else(|| candidates.next())
}

/// Build every dashboard view for a table.
///
/// # Errors
///
/// `Column` if an explicitly chosen numeric or categorical column is unusable;
/// `DataProcessing` on polars failures. Trend problems never fail the call.
pub fn summarize(df: &DataFrame, options: &DashboardOptions) -> Result<DashboardReport> {
    let classification = classify_columns(df, &options.date_hints);

    let mut columns = Vec::with_capacity(classification.columns.len());
    for class in &classification.columns {
        let col = df.column(&class.name)?;
        columns.push(ColumnOverview {
            class: class.clone(),
            nulls: col.null_count(),
            distinct: col.as_materialized_series().drop_nulls().n_unique()?,
        });
    }

    let description = describe(df, &classification)?;

    let distribution = pick(
        options.numeric_column.as_deref(),
        classification.numeric_columns(),
    )
    .map(|name| numeric_distribution(df, &classification, name, options.histogram_bins))
    .transpose()?;

    let frequency = pick(
        options.categorical_column.as_deref(),
        classification.categorical_columns(),
    )
    .map(|name| {
        categorical_frequency(df, &classification, name).map(|counts| (name.to_owned(), counts))
    })
    .transpose()?;

    let date_column = pick(options.date_column.as_deref(), classification.date_like_columns());
    let value_column = pick(
        options.value_column.as_deref(),
        classification.numeric_columns(),
    );
    let trend = match (date_column, value_column) {
        (Some(date), Some(value)) => match temporal_trend(df, &classification, date, value) {
            Ok(trend) => TrendView::Available(trend),
            Err(e) => {
                log::warn!("Trend of '{value}' over '{date}' unavailable: {e}");
                TrendView::Unavailable {
                    reason: e.to_string(),
                }
            }
        },
        _ => TrendView::NotApplicable,
    };

    Ok(DashboardReport {
        row_count: df.height(),
        column_count: df.width(),
        columns,
        classification,
        description,
        distribution,
        frequency,
        trend,
    })
}
