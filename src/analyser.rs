//! Tabular summarization engine.
//!
//! Every function here is pure over an in-memory [`polars::prelude::DataFrame`]:
//! classify the columns once, then hand the [`ColumnClassification`] to the
//! views that need it.
//!
//! ```no_run
//! use douane_insight::analyser::{classify_columns, describe, filter_rows, Selections};
//! use douane_insight::config::default_date_hints;
//! use polars::prelude::*;
//!
//! # fn main() -> douane_insight::error::Result<()> {
//! let df = df!(
//!     "ZONE" => &["Nord", "Sud", "Nord"],
//!     "TONNAGE" => &[120.0, 75.5, 310.2]
//! )?;
//! let classes = classify_columns(&df, &default_date_hints());
//!
//! let mut selections = Selections::new();
//! selections.insert("ZONE".to_owned(), ["Nord".to_owned()].into());
//! let nord = filter_rows(&df, &classes, &selections)?;
//!
//! let stats = describe(&nord, &classes)?;
//! assert_eq!(stats.get("TONNAGE").map(|s| s.count), Some(2));
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod dashboard;
pub mod filter;
pub mod io;
pub mod profiling;
pub mod temporal;
pub mod types;

pub use classify::classify_columns;
pub use dashboard::{DashboardOptions, DashboardReport, TrendView, summarize};
pub use filter::filter_rows;
pub use io::{read_table, read_table_from_bytes};
pub use profiling::{categorical_frequency, describe, grouped_totals, numeric_distribution};
pub use temporal::temporal_trend;
pub use types::{
    BoxSummary, ColumnClass, ColumnClassification, ColumnKind, DescribeStats, Description,
    HistogramBin, NumericDistribution, Selections, Trend, TrendPoint,
};
