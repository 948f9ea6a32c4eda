//! Column-wise data quality checks.
//!
//! Each check takes a loaded table and returns one result per column, keyed
//! by column name in table order:
//!
//! - **Nulls**: count and locate missing values
//! - **Duplicates**: count repeated non-null values and list them
//! - **Outliers**: flag numeric values whose Z-score exceeds a threshold
//!
//! The checks only read the table and share no state, so they can run in
//! any order.

mod duplicates;
mod nulls;
mod outliers;

pub use duplicates::{DuplicateColumnResult, check_column_duplicates, check_duplicates};
pub use nulls::{NullColumnResult, check_column_nulls, check_nulls};
pub use outliers::{
    NOTE_NO_DATA, NOTE_ZERO_STD, OutlierColumnResult, calculate_statistics,
    check_column_outliers, check_outliers,
};

/// Maximum number of row indices or values listed per column result.
/// Counts and ratios always cover the whole column.
pub const MAX_RECORDED_ENTRIES: usize = 100;
