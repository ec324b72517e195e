use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// CLASSIFICATION

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    /// Booleans, native dates and anything else that is neither numeric nor text.
    Unclassified,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Categorical => "Categorical",
            Self::Unclassified => "Unclassified",
        }
    }
}

/// Kind of one column plus the name-based date hint, which is independent of the kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnClass {
    pub name: String,
    pub kind: ColumnKind,
    pub date_like: bool,
}

/// Per-table classification, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnClassification {
    pub columns: Vec<ColumnClass>,
}

impl ColumnClassification {
    pub fn get(&self, name: &str) -> Option<&ColumnClass> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.get(name).map(|c| c.kind)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.of_kind(ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &str> {
        self.of_kind(ColumnKind::Categorical)
    }

    pub fn date_like_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.date_like)
            .map(|c| c.name.as_str())
    }

    fn of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.name.as_str())
    }
}

/// Column name to the set of values a row may hold to survive filtering.
pub type Selections = HashMap<String, HashSet<String>>;

// STATISTICS

/// `count` is the number of non-null values; the rest are NaN when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DescribeStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl DescribeStats {
    pub fn undefined() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    pub stats: DescribeStats,
}

/// Descriptive statistics for every numeric column, in table order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Description {
    pub columns: Vec<ColumnDescription>,
}

impl Description {
    pub fn get(&self, name: &str) -> Option<&DescribeStats> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.stats)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Five-number summary with Tukey fences (1.5 x IQR).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NumericDistribution {
    pub column: String,
    pub bins: Vec<HistogramBin>,
    pub box_summary: BoxSummary,
}

impl NumericDistribution {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

// TIME

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

/// Time-ordered series plus the source rows whose date could not be parsed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Trend {
    pub date_column: String,
    pub value_column: String,
    pub points: Vec<TrendPoint>,
    pub dropped_rows: Vec<usize>,
}

impl Trend {
    pub fn dropped(&self) -> usize {
        self.dropped_rows.len()
    }
}
