//! Z-score outlier check for numeric columns.
//!
//! Statistics use the sample standard deviation (divisor n - 1). A value is
//! flagged when `|value - mean| / std` is strictly greater than the
//! threshold. Columns that are not numeric are left out of the results.

use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MAX_RECORDED_ENTRIES;
use crate::error::Result;
use crate::utils::{is_numeric_dtype, ratio};

/// Note attached when every non-null value is identical.
pub const NOTE_ZERO_STD: &str = "standard deviation is zero";

/// Note attached when a numeric column has no non-null values.
pub const NOTE_NO_DATA: &str = "no data";

/// Outlier metrics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierColumnResult {
    pub outlier_count: usize,
    /// Row count of the table.
    pub total_count: usize,
    pub outlier_ratio: f64,
    /// Row indices of flagged values, ascending (first 100).
    pub outlier_indices: Vec<usize>,
    /// Mean of the non-null values; null when there are none.
    pub mean: Option<f64>,
    /// Sample standard deviation; null when there are no values.
    pub std: Option<f64>,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Run the outlier check on every numeric column of `df`.
pub fn check_outliers(
    df: &DataFrame,
    threshold: f64,
) -> Result<IndexMap<String, OutlierColumnResult>> {
    let mut results = IndexMap::new();

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        match check_column_outliers(series, threshold)? {
            Some(result) => {
                results.insert(series.name().to_string(), result);
            }
            None => debug!("Skipping non-numeric column '{}'", series.name()),
        }
    }

    Ok(results)
}

/// Flag the outliers of a single column.
///
/// Returns `None` when the column is not numeric. Non-finite values are
/// ignored for the statistics and never flagged.
pub fn check_column_outliers(series: &Series, threshold: f64) -> Result<Option<OutlierColumnResult>> {
    if !is_numeric_dtype(series.dtype()) {
        return Ok(None);
    }

    let total_count = series.len();
    let casted = series.cast(&DataType::Float64)?;
    let values: Vec<(usize, f64)> = casted
        .f64()?
        .into_iter()
        .enumerate()
        .filter_map(|(idx, v)| v.filter(|x| x.is_finite()).map(|x| (idx, x)))
        .collect();

    if values.is_empty() {
        return Ok(Some(OutlierColumnResult {
            outlier_count: 0,
            total_count,
            outlier_ratio: 0.0,
            outlier_indices: Vec::new(),
            mean: None,
            std: None,
            threshold,
            note: Some(NOTE_NO_DATA.to_string()),
        }));
    }

    let samples: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
    let (mean, std) = calculate_statistics(&samples);

    if std == 0.0 {
        return Ok(Some(OutlierColumnResult {
            outlier_count: 0,
            total_count,
            outlier_ratio: 0.0,
            outlier_indices: Vec::new(),
            mean: Some(mean),
            std: Some(0.0),
            threshold,
            note: Some(NOTE_ZERO_STD.to_string()),
        }));
    }

    let flagged: Vec<usize> = values
        .iter()
        .filter(|(_, value)| ((value - mean) / std).abs() > threshold)
        .map(|(idx, _)| *idx)
        .collect();
    let outlier_count = flagged.len();

    debug!(
        "Column '{}': mean={:.4}, std={:.4}, {} outliers above |z|={}",
        series.name(),
        mean,
        std,
        outlier_count,
        threshold
    );

    Ok(Some(OutlierColumnResult {
        outlier_count,
        total_count,
        outlier_ratio: ratio(outlier_count, total_count),
        outlier_indices: flagged.into_iter().take(MAX_RECORDED_ENTRIES).collect(),
        mean: Some(mean),
        std: Some(std),
        threshold,
        note: None,
    }))
}

/// Calculate mean and sample standard deviation (divisor n - 1).
///
/// Returns a standard deviation of exactly 0 for fewer than two values or
/// when every value is identical, so rounding in the mean cannot produce a
/// tiny non-zero spread.
pub fn calculate_statistics(values: &[f64]) -> (f64, f64) {
    let Some(&first) = values.first() else {
        return (0.0, 0.0);
    };

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    if values.len() < 2 || values.iter().all(|&v| v == first) {
        return (mean, 0.0);
    }

    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}
