//! Check orchestration: load → run checks per table → assemble report.

use std::path::Path;

use polars::prelude::*;
use tracing::{info, warn};

use crate::checks::{check_duplicates, check_nulls, check_outliers};
use crate::config::{CheckConfig, OutputTarget};
use crate::error::{Result, ResultExt};
use crate::loader::{NamedTable, load_tables};
use crate::report::{Report, TableReport, write_report};

/// Runs the null, duplicate and outlier checks with one configuration.
#[derive(Debug, Clone, Default)]
pub struct DataChecker {
    config: CheckConfig,
}

impl DataChecker {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run all three checks on one table.
    ///
    /// A table without rows is reported with zero counts and ratios.
    pub fn check_table(&self, df: &DataFrame) -> Result<TableReport> {
        if df.height() == 0 {
            warn!(
                "Table has no rows ({} columns); ratios are reported as 0",
                df.width()
            );
        }

        Ok(TableReport {
            null_check: check_nulls(df),
            duplicate_check: check_duplicates(df)?,
            outlier_check: check_outliers(df, self.config.outlier_threshold)?,
        })
    }

    /// Run the checks on every table, keeping table order.
    pub fn check_tables(&self, tables: &[NamedTable]) -> Result<Report> {
        let mut report = Report::new();
        for table in tables {
            let table_report = self
                .check_table(&table.data)
                .context(format!("Checking table '{}'", table.name))?;
            info!(
                "Checked table '{}': {} numeric of {} columns",
                table.name,
                table_report.outlier_check.len(),
                table_report.null_check.len()
            );
            report.insert(table.name.clone(), table_report);
        }
        Ok(report)
    }

    /// Load `input` and check every table in it.
    pub fn check_file(&self, input: impl AsRef<Path>) -> Result<Report> {
        let tables = load_tables(input)?;
        self.check_tables(&tables)
    }

    /// Load, check and write the report to the configured destination.
    ///
    /// Returns the report and where it was written.
    pub fn run(&self, input: impl AsRef<Path>) -> Result<(Report, OutputTarget)> {
        let input = input.as_ref();
        let report = self.check_file(input)?;
        let target = self.config.output_for(input);
        write_report(&report, &target)?;

        match &target {
            OutputTarget::File(path) => info!("Check results written to {}", path.display()),
            OutputTarget::Stdout => info!("Check results written to standard output"),
        }

        Ok((report, target))
    }
}
