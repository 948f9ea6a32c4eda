//! Shared utilities for the data checker.
//!
//! Dtype classification, missing-value markers and the ratio helper used by
//! every check.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a column data type for checking purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Signed integers
    SignedInteger,
    /// Unsigned integers
    UnsignedInteger,
    /// Floating point numbers
    Float,
    /// Boolean type
    Boolean,
    /// Text and everything rendered as text (dates, categoricals, ...)
    Text,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        get_dtype_category(dtype),
        DtypeCategory::SignedInteger | DtypeCategory::UnsignedInteger | DtypeCategory::Float
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    match dtype {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            DtypeCategory::SignedInteger
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            DtypeCategory::UnsignedInteger
        }
        DataType::Float32 | DataType::Float64 => DtypeCategory::Float,
        DataType::Boolean => DtypeCategory::Boolean,
        _ => DtypeCategory::Text,
    }
}

/// Get the dtype category as a string, used in log lines.
pub fn dtype_category_str(series: &Series) -> &'static str {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::SignedInteger | DtypeCategory::UnsignedInteger => "integer",
        DtypeCategory::Float => "float",
        DtypeCategory::Boolean => "boolean",
        DtypeCategory::Text => "text",
    }
}

// =============================================================================
// Missing Value Utilities
// =============================================================================

/// Cell contents read as missing values, in addition to empty fields.
///
/// This is the usual set of spreadsheet and dataframe NA spellings. Empty
/// strings count as missing too: a blank cell and an empty quoted field are
/// indistinguishable in the report.
pub const MISSING_VALUE_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw text cell is a missing-value marker.
///
/// Surrounding whitespace is ignored; matching is case-sensitive, so
/// `"none"` is data while `"None"` is missing.
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    MISSING_VALUE_MARKERS.iter().any(|&marker| trimmed == marker)
}

// =============================================================================
// Arithmetic Utilities
// =============================================================================

/// `count / total`, or 0 when `total` is 0.
#[inline]
pub fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

// =============================================================================
// Tests
// =============================================================================
