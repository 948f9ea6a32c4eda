//! Report types and output.
//!
//! A [`Report`] maps table name to [`TableReport`], which holds the three
//! per-column check results. Maps keep insertion order, so the JSON lists
//! tables in file order and columns in table order, and two runs over the
//! same input produce byte-identical output.
//!
//! # Example
//!
//! ```rust,ignore
//! use data_checker::report::write_report;
//! use data_checker::config::OutputTarget;
//!
//! write_report(&report, &OutputTarget::Stdout)?;
//! ```

use std::fs;
use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checks::{DuplicateColumnResult, NullColumnResult, OutlierColumnResult};
use crate::config::OutputTarget;
use crate::error::{Result, ResultExt};

/// Check results for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableReport {
    pub null_check: IndexMap<String, NullColumnResult>,
    pub duplicate_check: IndexMap<String, DuplicateColumnResult>,
    /// Numeric columns only.
    pub outlier_check: IndexMap<String, OutlierColumnResult>,
}

/// Check results for every table of an input file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub tables: IndexMap<String, TableReport>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the results of one table. A later table with the same name replaces
    /// the earlier one but keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, table: TableReport) {
        self.tables.insert(name.into(), table);
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Serialize as UTF-8 JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the report to a file or standard output.
///
/// Parent directories of a file target are created as needed. The document
/// ends with a newline.
pub fn write_report(report: &Report, target: &OutputTarget) -> Result<()> {
    let json = report.to_json_pretty()?;

    match target {
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)
                    .context(format!("Cannot create directory '{}'", parent.display()))?;
            }
            fs::write(path, format!("{json}\n"))
                .context(format!("Cannot write report '{}'", path.display()))?;
            debug!("Wrote {} bytes to {}", json.len() + 1, path.display());
        }
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
            stdout.flush()?;
        }
    }

    Ok(())
}
