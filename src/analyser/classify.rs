use super::types::{ColumnClass, ColumnClassification, ColumnKind};
use polars::prelude::*;

/// Kind from the column's storage type: numbers are numeric, text is categorical.
pub fn kind_of_dtype(dtype: &DataType) -> ColumnKind {
    if dtype.is_primitive_numeric() {
        ColumnKind::Numeric
    } else if dtype.is_string() {
        ColumnKind::Categorical
    } else {
        ColumnKind::Unclassified
    }
}

/// Name-based heuristic; the column's contents are never inspected.
pub fn is_date_like(name: &str, hints: &[String]) -> bool {
    let lower = name.to_lowercase();
    hints
        .iter()
        .any(|hint| !hint.is_empty() && lower.contains(&hint.to_lowercase()))
}

pub fn classify_columns(df: &DataFrame, date_hints: &[String]) -> ColumnClassification {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            let name = col.name().to_string();
            ColumnClass {
                kind: kind_of_dtype(col.dtype()),
                date_like: is_date_like(&name, date_hints),
                name,
            }
        })
        .collect();

    ColumnClassification { columns }
}
