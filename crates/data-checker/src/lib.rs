//! Data Checker Library
//!
//! Column-wise data quality checks for CSV files and spreadsheet workbooks,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! For every table in the input (the CSV file itself, or each workbook sheet)
//! three independent checks run over every column:
//!
//! - **Null check**: number, ratio and row indices of missing values
//! - **Duplicate check**: distinct and repeated non-null values
//! - **Outlier check**: Z-score outliers in numeric columns (sample standard
//!   deviation, strict `|z| > threshold`)
//!
//! The results are assembled into a [`Report`] and written as indented JSON.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_checker::{CheckConfig, DataChecker};
//!
//! let config = CheckConfig::builder()
//!     .outlier_threshold(2.5)
//!     .output_path("results/sales_check.json")
//!     .build()?;
//!
//! let (report, target) = DataChecker::new(config).run("data/sales.xlsx")?;
//! for name in report.table_names() {
//!     println!("checked sheet {name}");
//! }
//! ```
//!
//! # Missing values
//!
//! Empty cells, empty strings and the markers in
//! [`utils::MISSING_VALUE_MARKERS`] are all treated as missing.

pub mod checker;
pub mod checks;
pub mod config;
pub mod error;
pub mod loader;
pub mod report;
pub mod utils;

// Re-exports for convenient access
pub use checker::DataChecker;
pub use checks::{
    DuplicateColumnResult, MAX_RECORDED_ENTRIES, NullColumnResult, OutlierColumnResult,
    check_duplicates, check_nulls, check_outliers,
};
pub use config::{
    CheckConfig, CheckConfigBuilder, ConfigValidationError, DEFAULT_OUTLIER_THRESHOLD,
    OutputTarget,
};
pub use error::{CheckerError, Result as CheckerResult, ResultExt};
pub use loader::{FileKind, NamedTable, load_tables};
pub use report::{Report, TableReport, write_report};
