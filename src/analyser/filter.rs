use super::types::{ColumnClassification, ColumnKind, Selections};
use crate::error::Result;
use polars::prelude::*;

/// Keep the rows whose categorical values are all among the selected ones.
///
/// Each selected column must match (AND across columns). A column whose
/// selection set is empty does not constrain anything; selecting nothing is
/// treated as "no filter on this column", not "exclude every row". Nulls never
/// match a non-empty selection. The input frame is left untouched.
///
/// # Errors
///
/// `DataProcessing` if polars cannot apply the mask.
pub fn filter_rows(
    df: &DataFrame,
    classes: &ColumnClassification,
    selections: &Selections,
) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    let mut constrained = false;

    // Walk in table order so the outcome does not depend on map iteration.
    for class in &classes.columns {
        let Some(allowed) = selections.get(&class.name) else {
            continue;
        };
        if allowed.is_empty() {
            continue;
        }
        if class.kind != ColumnKind::Categorical {
            log::warn!(
                "Ignoring selection on '{}': {} columns cannot be filtered by value",
                class.name,
                class.kind.as_str()
            );
            continue;
        }

        let values = df.column(&class.name)?.as_materialized_series().str()?;
        for (flag, value) in keep.iter_mut().zip(values) {
            *flag = *flag && value.is_some_and(|v| allowed.contains(v));
        }
        constrained = true;
    }

    let mut unknown: Vec<&str> = selections
        .keys()
        .filter(|name| classes.get(name).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        log::warn!("Ignoring selections on unknown columns: {}", unknown.join(", "));
    }

    if !constrained {
        return Ok(df.clone());
    }

    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    let filtered = df.filter(&mask)?;
    log::debug!("Filter kept {} of {} rows", filtered.height(), df.height());
    Ok(filtered)
}
