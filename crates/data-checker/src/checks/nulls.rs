//! Missing value check.

use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::MAX_RECORDED_ENTRIES;
use crate::utils::ratio;

/// Missing value metrics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullColumnResult {
    pub null_count: usize,
    /// Row count of the table.
    pub total_count: usize,
    pub null_ratio: f64,
    /// Row indices holding a missing value, ascending (first 100).
    pub null_indices: Vec<usize>,
}

/// Run the missing value check on every column of `df`.
pub fn check_nulls(df: &DataFrame) -> IndexMap<String, NullColumnResult> {
    df.get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            (series.name().to_string(), check_column_nulls(series))
        })
        .collect()
}

/// Count and locate the missing values of a single column.
pub fn check_column_nulls(series: &Series) -> NullColumnResult {
    let total_count = series.len();
    let null_count = series.null_count();

    let null_indices: Vec<usize> = if null_count == 0 {
        Vec::new()
    } else {
        series
            .is_null()
            .into_iter()
            .enumerate()
            .filter(|(_, is_null)| is_null.unwrap_or(false))
            .map(|(idx, _)| idx)
            .take(MAX_RECORDED_ENTRIES)
            .collect()
    };

    NullColumnResult {
        null_count,
        total_count,
        null_ratio: ratio(null_count, total_count),
        null_indices,
    }
}
