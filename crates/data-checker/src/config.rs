//! Configuration types for the data checker.
//!
//! The only tunable check parameter is the Z-score threshold; the rest of the
//! configuration decides where the report is written.

use std::path::{Path, PathBuf};

/// Default Z-score magnitude above which a value is reported as an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Suffix appended to the input file stem for the derived report path.
pub const REPORT_FILE_SUFFIX: &str = "_check_result.json";

/// Where the JSON report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to a file, creating parent directories as needed.
    File(PathBuf),
    /// Write to standard output.
    Stdout,
}

impl OutputTarget {
    /// Derive the default report location for an input file:
    /// `<input dir>/<input stem>_check_result.json`.
    pub fn for_input(input: &Path) -> Self {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let file_name = format!("{stem}{REPORT_FILE_SUFFIX}");
        let path = match input.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
            _ => PathBuf::from(file_name),
        };
        OutputTarget::File(path)
    }
}

/// Configuration for a check run.
///
/// Use [`CheckConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use data_checker::config::CheckConfig;
///
/// let config = CheckConfig::builder()
///     .outlier_threshold(2.5)
///     .output_path("report.json")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    /// Z-score magnitude above which a value is flagged.
    /// Default: 3.0
    pub outlier_threshold: f64,

    /// Report destination. If None, the location is derived from the input path.
    /// Default: None
    pub output: Option<OutputTarget>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            output: None,
        }
    }
}

impl CheckConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(
                self.outlier_threshold,
            ));
        }

        if let Some(OutputTarget::File(path)) = &self.output
            && path.as_os_str().is_empty()
        {
            return Err(ConfigValidationError::EmptyOutputPath);
        }

        Ok(())
    }

    /// Resolve the report destination for a given input file.
    pub fn output_for(&self, input: &Path) -> OutputTarget {
        self.output
            .clone()
            .unwrap_or_else(|| OutputTarget::for_input(input))
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier threshold: {0} (must be a finite number greater than 0)")]
    InvalidThreshold(f64),

    #[error("Output path must not be empty")]
    EmptyOutputPath,
}

/// Builder for [`CheckConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CheckConfigBuilder {
    outlier_threshold: Option<f64>,
    output: Option<OutputTarget>,
}

impl CheckConfigBuilder {
    /// Set the Z-score threshold for outlier detection.
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = Some(threshold);
        self
    }

    /// Write the report to a file.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(OutputTarget::File(path.into()));
        self
    }

    /// Write the report to standard output.
    pub fn stdout(mut self) -> Self {
        self.output = Some(OutputTarget::Stdout);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CheckConfig` or an error if validation fails.
    pub fn build(self) -> Result<CheckConfig, ConfigValidationError> {
        let config = CheckConfig {
            outlier_threshold: self
                .outlier_threshold
                .unwrap_or(DEFAULT_OUTLIER_THRESHOLD),
            output: self.output,
        };

        config.validate()?;
        Ok(config)
    }
}
