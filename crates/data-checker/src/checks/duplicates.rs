//! Duplicate value check.
//!
//! Nulls are excluded: a column with three missing cells has no duplicates.

use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::MAX_RECORDED_ENTRIES;
use crate::error::Result;
use crate::utils::{DtypeCategory, get_dtype_category, ratio};

/// Duplicate metrics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateColumnResult {
    /// Number of non-null values.
    pub total_count: usize,
    /// Number of distinct non-null values.
    pub unique_count: usize,
    /// `total_count - unique_count`: occurrences beyond the first of each value.
    pub duplicate_count: usize,
    pub duplicate_ratio: f64,
    /// Values occurring more than once, in first-seen order (first 100).
    pub duplicated_values: Vec<serde_json::Value>,
}

/// Hashable identity of a non-null cell.
///
/// Floats are keyed by bit pattern with `-0.0` folded into `0.0`; NaN never
/// reaches this point because loading turns it into null.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey {
    Int(i64),
    UInt(u64),
    Float(u64),
    Bool(bool),
    Text(String),
}

impl CellKey {
    fn float(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        CellKey::Float(value.to_bits())
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            CellKey::Int(v) => json!(v),
            CellKey::UInt(v) => json!(v),
            CellKey::Float(bits) => json!(f64::from_bits(*bits)),
            CellKey::Bool(v) => json!(v),
            CellKey::Text(s) => json!(s),
        }
    }
}

/// Run the duplicate check on every column of `df`.
pub fn check_duplicates(df: &DataFrame) -> Result<IndexMap<String, DuplicateColumnResult>> {
    df.get_columns()
        .iter()
        .map(|col| -> Result<(String, DuplicateColumnResult)> {
            let series = col.as_materialized_series();
            Ok((series.name().to_string(), check_column_duplicates(series)?))
        })
        .collect()
}

/// Count distinct and repeated non-null values of a single column.
pub fn check_column_duplicates(series: &Series) -> Result<DuplicateColumnResult> {
    let keys = non_null_keys(series)?;
    let total_count = keys.len();

    // Insertion order of the map is first-seen order.
    let mut occurrences: IndexMap<CellKey, usize> = IndexMap::new();
    for key in keys {
        *occurrences.entry(key).or_insert(0) += 1;
    }

    let unique_count = occurrences.len();
    let duplicate_count = total_count - unique_count;
    let duplicated_values = occurrences
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(key, _)| key.to_json())
        .take(MAX_RECORDED_ENTRIES)
        .collect();

    Ok(DuplicateColumnResult {
        total_count,
        unique_count,
        duplicate_count,
        duplicate_ratio: ratio(duplicate_count, total_count),
        duplicated_values,
    })
}

/// Non-null cells of a column as keys, in row order.
fn non_null_keys(series: &Series) -> Result<Vec<CellKey>> {
    let keys = match get_dtype_category(series.dtype()) {
        DtypeCategory::SignedInteger => {
            let casted = series.cast(&DataType::Int64)?;
            casted.i64()?.into_iter().flatten().map(CellKey::Int).collect()
        }
        DtypeCategory::UnsignedInteger => {
            let casted = series.cast(&DataType::UInt64)?;
            casted.u64()?.into_iter().flatten().map(CellKey::UInt).collect()
        }
        DtypeCategory::Float => {
            let casted = series.cast(&DataType::Float64)?;
            casted
                .f64()?
                .into_iter()
                .flatten()
                .map(CellKey::float)
                .collect()
        }
        DtypeCategory::Boolean => series.bool()?.into_iter().flatten().map(CellKey::Bool).collect(),
        DtypeCategory::Text => {
            let casted = series.cast(&DataType::String)?;
            casted
                .str()?
                .into_iter()
                .flatten()
                .map(|s| CellKey::Text(s.to_string()))
                .collect()
        }
    };
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_duplicates_exclude_nulls() {
        let series = Series::new(
            "name".into(),
            &[Some("a"), Some("b"), Some("a"), None, Some("b"), Some("b")],
        );
        let result = check_column_duplicates(&series).unwrap();

        assert_eq!(result.total_count, 5);
        assert_eq!(result.unique_count, 2);
        assert_eq!(result.duplicate_count, 3);
        assert!((result.duplicate_ratio - 0.6).abs() < 1e-12);
        assert_eq!(result.duplicated_values, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_duplicated_values_keep_first_seen_order() {
        let series = Series::new("v".into(), &[5i64, 7, 1, 7, 5, 9]);
        let result = check_column_duplicates(&series).unwrap();

        assert_eq!(result.duplicated_values, vec![json!(5), json!(7)]);
        assert_eq!(result.duplicate_count, 2);
    }

    #[test]
    fn test_numeric_values_stay_numeric() {
        let series = Series::new("v".into(), &[1.5f64, 2.0, 1.5]);
        let result = check_column_duplicates(&series).unwrap();
        assert_eq!(result.duplicated_values, vec![json!(1.5)]);
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        let series = Series::new("v".into(), &[0.0f64, -0.0]);
        let result = check_column_duplicates(&series).unwrap();
        assert_eq!(result.unique_count, 1);
        assert_eq!(result.duplicate_count, 1);
    }

    #[test]
    fn test_boolean_duplicates() {
        let series = Series::new("flag".into(), &[Some(true), None, Some(true), Some(false)]);
        let result = check_column_duplicates(&series).unwrap();
        assert_eq!(result.duplicated_values, vec![json!(true)]);
    }

    #[test]
    fn test_all_unique() {
        let series = Series::new("id".into(), &[1i64, 2, 3]);
        let result = check_column_duplicates(&series).unwrap();

        assert_eq!(result.duplicate_count, 0);
        assert_eq!(result.duplicate_ratio, 0.0);
        assert!(result.duplicated_values.is_empty());
    }

    #[test]
    fn test_all_null_column() {
        let series = Series::new("v".into(), &[None::<f64>, None]);
        let result = check_column_duplicates(&series).unwrap();

        assert_eq!(result.total_count, 0);
        assert_eq!(result.unique_count, 0);
        assert_eq!(result.duplicate_ratio, 0.0);
    }

    #[test]
    fn test_duplicate_invariants_hold_per_column() {
        let df = df![
            "a" => [Some(1i64), Some(1), None, Some(2), Some(2), Some(2)],
            "b" => ["x", "y", "z", "x", "x", "w"],
        ]
        .unwrap();

        let results = check_duplicates(&df).unwrap();
        for (name, result) in &results {
            let col = df.column(name).unwrap();
            assert!(result.duplicate_count <= result.total_count);
            assert_eq!(result.total_count, col.len() - col.null_count());
            assert_eq!(result.unique_count + result.duplicate_count, result.total_count);
        }
    }
}
