//! Pipeline orchestration: load, clean, derive, link, aggregate, write.
//!
//! Each stage translates its failures into a stage-labeled error variant,
//! so callers (and `--json` consumers) can tell a bad input file from a
//! mid-run failure.

use crate::cleaner::{CleanOutcome, clean_dataset};
use crate::config::PipelineConfig;
use crate::error::{AnalyticsError, Result, ResultExt};
use crate::linker::{BikeTypes, StationNames};
use crate::loader::load_table;
use crate::metrics::{BusinessStats, compute_business_stats, ensure_derived_columns};
use crate::report::ReportWriter;
use polars::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// The cleaned tables, kept for export and for callers that want to run
/// their own queries afterwards.
#[derive(Debug, Clone)]
pub struct CleanedTables {
    pub stations: DataFrame,
    pub trips: DataFrame,
    pub maintenance: DataFrame,
}

/// Everything a finished run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub stats: BusinessStats,
    pub tables: CleanedTables,
    pub cleaning: Vec<CleanOutcome>,
    /// Files written, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// End-to-end batch pipeline over the three CSV tables.
pub struct AnalyticsPipeline {
    config: PipelineConfig,
    writer: ReportWriter,
}

// Runs are handed to worker threads by embedding callers
static_assertions::assert_impl_all!(AnalyticsPipeline: Send);
static_assertions::assert_impl_all!(PipelineOutcome: Send);

impl AnalyticsPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let writer = ReportWriter::new(config.output_dir.clone());
        Self { config, writer }
    }

    /// Run the pipeline end to end.
    pub fn run(&self) -> Result<PipelineOutcome> {
        match self.run_internal() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Pipeline failed: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self) -> Result<PipelineOutcome> {
        let started = Instant::now();
        self.config.validate()?;

        info!("Stage 1: loading datasets");
        let stations_raw = load_table(&self.config.stations_path)?;
        let trips_raw = load_table(&self.config.trips_path)?;
        let maintenance_raw = load_table(&self.config.maintenance_path)?;

        info!("Stage 2: cleaning records");
        let (stations, stations_outcome) = clean_stage(stations_raw, "stations")?;
        let (trips, trips_outcome) = clean_stage(trips_raw, "trips")?;
        let (maintenance, maintenance_outcome) = clean_stage(maintenance_raw, "maintenance")?;
        let cleaning = vec![stations_outcome, trips_outcome, maintenance_outcome];

        info!("Stage 3: deriving trip columns");
        let trips = ensure_derived_columns(trips)
            .map_err(|e| AnalyticsError::AggregationFailed(e.to_string()))?;

        info!("Stage 4: linking tables");
        let station_names =
            StationNames::from_table(&stations).context("building station name lookup")?;
        let bike_types = BikeTypes::from_trips(&trips).context("building bike type lookup")?;

        info!("Stage 5: aggregating business metrics");
        let stats = compute_business_stats(&trips, &maintenance, &station_names, &bike_types)
            .map_err(|e| AnalyticsError::AggregationFailed(e.to_string()))?;

        info!("Stage 6: writing reports and exports");
        let mut tables = CleanedTables {
            stations,
            trips,
            maintenance,
        };
        let artifacts = self.write_artifacts(&stats, &cleaning, &mut tables)?;

        info!(
            "Pipeline finished in {:.2}s: {} trips analyzed, {} artifacts written",
            started.elapsed().as_secs_f64(),
            stats.total_trips,
            artifacts.len()
        );

        Ok(PipelineOutcome {
            stats,
            tables,
            cleaning,
            artifacts,
        })
    }

    fn write_artifacts(
        &self,
        stats: &BusinessStats,
        cleaning: &[CleanOutcome],
        tables: &mut CleanedTables,
    ) -> Result<Vec<PathBuf>> {
        let mut artifacts = Vec::new();

        if self.config.write_summary {
            let path = self
                .writer
                .write_summary(stats, cleaning)
                .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;
            artifacts.push(path);
        }
        if self.config.write_json_stats {
            let path = self
                .writer
                .write_json_stats(stats)
                .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;
            artifacts.push(path);
        }
        if self.config.export_cleaned {
            for (name, df) in [
                ("stations", &mut tables.stations),
                ("trips", &mut tables.trips),
                ("maintenance", &mut tables.maintenance),
            ] {
                let path = self
                    .writer
                    .export_cleaned(name, df)
                    .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;
                artifacts.push(path);
            }
        }

        Ok(artifacts)
    }
}

fn clean_stage(df: DataFrame, label: &str) -> Result<(DataFrame, CleanOutcome)> {
    clean_dataset(df, label).map_err(|e| AnalyticsError::CleaningFailed {
        dataset: label.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_fixtures(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("stations.csv"),
            "station_id,station_name,capacity,latitude,longitude\n\
             1,Central,20,50.45,30.52\n\
             2,Harbor,15,50.46,30.61\n",
        )
        .unwrap();
        fs::write(
            dir.join("trips.csv"),
            "trip_id,bike_id,user_id,user_type,bike_type,start_station_id,end_station_id,start_time,end_time,distance_km\n\
             1,10,100,member,electric,1,2,2024-01-01 08:00:00,2024-01-01 08:30:00,2.5\n\
             2,11,101,casual,classic,2,1,2024-01-01 09:00:00,2024-01-01 09:20:00,1.5\n\
             2,11,101,casual,classic,2,1,2024-01-01 09:00:00,2024-01-01 09:20:00,1.5\n\
             3,10,100,member,electric,1,2,2024-01-02 08:10:00,2024-01-02 08:05:00,3.0\n",
        )
        .unwrap();
        fs::write(
            dir.join("maintenance.csv"),
            "record_id,bike_id,maintenance_date,maintenance_type,cost\n\
             1,10,2024-01-15,brake repair,30.0\n\
             2,11,2024-02-01,tire,12.5\n",
        )
        .unwrap();
    }

    #[test]
    fn test_pipeline_run_end_to_end() {
        let base = std::env::temp_dir().join(format!("citybike_pipeline_{}", std::process::id()));
        let data_dir = base.join("data");
        let out_dir = base.join("out");
        write_fixtures(&data_dir);

        let config = PipelineConfig::builder()
            .data_dir(&data_dir)
            .output_dir(&out_dir)
            .build()
            .unwrap();

        let outcome = AnalyticsPipeline::new(config).run().unwrap();

        // One duplicate trip and one inverted window dropped
        assert_eq!(outcome.stats.total_trips, 2);
        assert_eq!(outcome.cleaning[1].dropped_rows, 2);
        assert_eq!(outcome.tables.trips.height(), 2);

        // summary + json + three cleaned exports
        assert_eq!(outcome.artifacts.len(), 5);
        for path in &outcome.artifacts {
            assert!(path.exists(), "missing artifact {}", path.display());
        }

        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn test_pipeline_toggles_skip_artifacts() {
        let base = std::env::temp_dir().join(format!("citybike_toggles_{}", std::process::id()));
        let data_dir = base.join("data");
        write_fixtures(&data_dir);

        let config = PipelineConfig::builder()
            .data_dir(&data_dir)
            .output_dir(base.join("out"))
            .export_cleaned(false)
            .write_summary(false)
            .write_json_stats(false)
            .build()
            .unwrap();

        let outcome = AnalyticsPipeline::new(config).run().unwrap();
        assert!(outcome.artifacts.is_empty());

        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn test_pipeline_missing_dataset_is_fatal() {
        let base = std::env::temp_dir().join(format!("citybike_missing_{}", std::process::id()));

        let config = PipelineConfig::builder()
            .data_dir(base.join("nowhere"))
            .output_dir(base.join("out"))
            .build()
            .unwrap();

        let err = AnalyticsPipeline::new(config).run().unwrap_err();
        assert_eq!(err.error_code(), "DATASET_NOT_FOUND");
        assert!(err.is_recoverable());

        fs::remove_dir_all(&base).ok();
    }
}
