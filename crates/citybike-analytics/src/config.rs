//! Configuration types for the analytics pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one pipeline run.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use citybike_analytics::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .data_dir("data")
///     .output_dir("output")
///     .export_cleaned(false)
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the stations CSV.
    /// Default: "data/stations.csv"
    pub stations_path: PathBuf,

    /// Path to the trips CSV.
    /// Default: "data/trips.csv"
    pub trips_path: PathBuf,

    /// Path to the maintenance records CSV.
    /// Default: "data/maintenance.csv"
    pub maintenance_path: PathBuf,

    /// Output directory for the report and exported tables.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Whether to export the cleaned tables as CSV (consumed by the
    /// visualizer).
    /// Default: true
    pub export_cleaned: bool,

    /// Whether to write the human-readable summary report.
    /// Default: true
    pub write_summary: bool,

    /// Whether to write the machine-readable stats document
    /// (business_stats.json).
    /// Default: true
    pub write_json_stats: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stations_path: PathBuf::from("data/stations.csv"),
            trips_path: PathBuf::from("data/trips.csv"),
            maintenance_path: PathBuf::from("data/maintenance.csv"),
            output_dir: PathBuf::from("output"),
            export_cleaned: true,
            write_summary: true,
            write_json_stats: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, path) in [
            ("stations_path", &self.stations_path),
            ("trips_path", &self.trips_path),
            ("maintenance_path", &self.maintenance_path),
            ("output_dir", &self.output_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid path for '{field}': path is empty")]
    EmptyPath { field: String },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    data_dir: Option<PathBuf>,
    stations_path: Option<PathBuf>,
    trips_path: Option<PathBuf>,
    maintenance_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    export_cleaned: Option<bool>,
    write_summary: Option<bool>,
    write_json_stats: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the directory the three dataset files are resolved against.
    ///
    /// Individual path setters take precedence over the derived
    /// `{data_dir}/stations.csv` etc. defaults.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set an explicit path for the stations CSV.
    pub fn stations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stations_path = Some(path.into());
        self
    }

    /// Set an explicit path for the trips CSV.
    pub fn trips_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trips_path = Some(path.into());
        self
    }

    /// Set an explicit path for the maintenance CSV.
    pub fn maintenance_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.maintenance_path = Some(path.into());
        self
    }

    /// Set the output directory for the report and exported tables.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable exporting cleaned tables as CSV.
    pub fn export_cleaned(mut self, export: bool) -> Self {
        self.export_cleaned = Some(export);
        self
    }

    /// Enable or disable the text summary report.
    pub fn write_summary(mut self, write: bool) -> Self {
        self.write_summary = Some(write);
        self
    }

    /// Enable or disable the JSON stats document.
    pub fn write_json_stats(mut self, write: bool) -> Self {
        self.write_json_stats = Some(write);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let data_dir = self.data_dir.unwrap_or_else(|| PathBuf::from("data"));

        let config = PipelineConfig {
            stations_path: self
                .stations_path
                .unwrap_or_else(|| data_dir.join("stations.csv")),
            trips_path: self.trips_path.unwrap_or_else(|| data_dir.join("trips.csv")),
            maintenance_path: self
                .maintenance_path
                .unwrap_or_else(|| data_dir.join("maintenance.csv")),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            export_cleaned: self.export_cleaned.unwrap_or(true),
            write_summary: self.write_summary.unwrap_or(true),
            write_json_stats: self.write_json_stats.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.stations_path, PathBuf::from("data/stations.csv"));
        assert_eq!(config.trips_path, PathBuf::from("data/trips.csv"));
        assert_eq!(
            config.maintenance_path,
            PathBuf::from("data/maintenance.csv")
        );
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.export_cleaned);
        assert!(config.write_summary);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.stations_path, PathBuf::from("data/stations.csv"));
        assert!(config.write_json_stats);
    }

    #[test]
    fn test_builder_data_dir_derives_file_paths() {
        let config = PipelineConfig::builder()
            .data_dir("/srv/citybike")
            .build()
            .unwrap();

        assert_eq!(
            config.trips_path,
            PathBuf::from("/srv/citybike/trips.csv")
        );
        assert_eq!(
            config.maintenance_path,
            PathBuf::from("/srv/citybike/maintenance.csv")
        );
    }

    #[test]
    fn test_builder_explicit_path_beats_data_dir() {
        let config = PipelineConfig::builder()
            .data_dir("/srv/citybike")
            .trips_path("/tmp/special_trips.csv")
            .build()
            .unwrap();

        assert_eq!(config.trips_path, PathBuf::from("/tmp/special_trips.csv"));
        assert_eq!(
            config.stations_path,
            PathBuf::from("/srv/citybike/stations.csv")
        );
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .output_dir("reports")
            .export_cleaned(false)
            .write_summary(false)
            .build()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert!(!config.export_cleaned);
        assert!(!config.write_summary);
    }

    #[test]
    fn test_validation_empty_path() {
        let result = PipelineConfig::builder().trips_path("").build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyPath { .. }
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.trips_path, deserialized.trips_path);
        assert_eq!(config.export_cleaned, deserialized.export_cleaned);
    }

    #[test]
    fn test_pipeline_config_from_json() {
        let json = r#"{
            "stations_path": "data/stations.csv",
            "trips_path": "data/trips.csv",
            "maintenance_path": "data/maintenance.csv",
            "output_dir": "custom_output",
            "export_cleaned": false,
            "write_summary": true,
            "write_json_stats": false
        }"#;

        let config: PipelineConfig =
            serde_json::from_str(json).expect("Should deserialize from JSON");

        assert_eq!(config.output_dir.to_str().unwrap(), "custom_output");
        assert!(!config.export_cleaned);
        assert!(config.write_summary);
        assert!(!config.write_json_stats);
    }
}
