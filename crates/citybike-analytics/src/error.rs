//! Custom error types for the analytics pipeline.
//!
//! The pipeline has exactly one fatal failure mode: a dataset file that is
//! missing or unreadable. Every row-level defect (nulls, negative distances,
//! bad time ordering, duplicates) is resolved by the cleaner's drop-or-default
//! policy and reported as a count, never as an error. The remaining variants
//! here wrap infrastructure failures (IO, Polars, JSON) and configuration
//! mistakes so the binary can map them to exit codes and `--json` payloads.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Dataset file missing or unreadable. Fatal for the whole run.
    #[error("Dataset file not found or unreadable: {path}")]
    DatasetNotFound { path: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record cleaning failed.
    #[error("Failed to clean dataset '{dataset}': {reason}")]
    CleaningFailed { dataset: String, reason: String },

    /// Metric aggregation failed.
    #[error("Failed to aggregate metrics: {0}")]
    AggregationFailed(String),

    /// Report or export writing failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalyticsError>,
    },
}

impl AnalyticsError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalyticsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output (`--json` mode).
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DatasetNotFound { .. } => "DATASET_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CleaningFailed { .. } => "CLEANING_FAILED",
            Self::AggregationFailed(_) => "AGGREGATION_FAILED",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error can be fixed by the caller without touching data
    /// (bad paths, bad config) as opposed to a failure mid-run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DatasetNotFound { .. } | Self::InvalidConfig(_)
        )
    }
}

/// Errors serialize as a `code`/`message` struct so the `--json` CLI mode can
/// emit them alongside successful stats documents.
impl Serialize for AnalyticsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalyticsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyticsError::Polars(e).with_context(context))
    }
}

impl From<crate::config::ConfigValidationError> for AnalyticsError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        AnalyticsError::InvalidConfig(err.to_string())
    }
}
