//! CityBike Analytics Pipeline Library
//!
//! A batch analytics pipeline for bike-share systems built with Rust and Polars.
//!
//! # Overview
//!
//! This library turns three raw CSV exports (stations, trips, maintenance)
//! into a business report:
//!
//! - **Data Cleaning**: Duplicate removal, timestamp normalization, missing
//!   value handling, invalid record filtering
//! - **Cross-Table Linking**: Station names and bike types resolved across
//!   tables without a database
//! - **Business Metrics**: Trip volume, station rankings, temporal patterns,
//!   rider behavior, fleet utilization, maintenance costs
//! - **Reporting**: Human-readable text summary, machine-readable JSON stats,
//!   cleaned CSV exports for downstream visualization
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use citybike_analytics::{AnalyticsPipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .data_dir("data")
//!     .output_dir("output")
//!     .build()?;
//!
//! let outcome = AnalyticsPipeline::new(config).run()?;
//!
//! println!("Trips analyzed: {}", outcome.stats.total_trips);
//! println!("Peak hour: {:?}", outcome.stats.peak_hour);
//! for path in &outcome.artifacts {
//!     println!("Wrote {}", path.display());
//! }
//! ```
//!
//! # Working With the Pieces
//!
//! Every stage is usable on its own. A caller that only wants cleaned
//! frames, or only the aggregates, can skip the orchestrator:
//!
//! ```rust,ignore
//! use citybike_analytics::cleaner::clean_dataset;
//! use citybike_analytics::linker::{BikeTypes, StationNames};
//! use citybike_analytics::metrics::{compute_business_stats, ensure_derived_columns};
//! use citybike_analytics::loader::load_table;
//!
//! let (stations, _) = clean_dataset(load_table("data/stations.csv".as_ref())?, "stations")?;
//! let (trips, outcome) = clean_dataset(load_table("data/trips.csv".as_ref())?, "trips")?;
//! println!("Dropped {} bad trip rows", outcome.dropped_rows);
//!
//! let trips = ensure_derived_columns(trips)?;
//! let names = StationNames::from_table(&stations)?;
//! let bikes = BikeTypes::from_trips(&trips)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod linker;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod ordering;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CleanOutcome, SchemaHints, clean_dataset};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{AnalyticsError, Result as AnalyticsResult, ResultExt};
pub use linker::{BikeTypes, StationNames};
pub use loader::load_table;
pub use metrics::{
    BusinessStats, DescriptiveStats, RouteActivity, StationActivity, UserActivity,
    compute_business_stats, ensure_derived_columns,
};
pub use models::{
    Bike, BikeKind, MaintenanceRecord, MembershipTier, Station, Trip, User, UserKind,
};
pub use ordering::{binary_search_by_key, merge_sort_by_key};
pub use pipeline::{AnalyticsPipeline, CleanedTables, PipelineOutcome};
pub use report::{ReportWriter, render_summary};
pub use utils::{
    DtypeCategory, fill_numeric_nulls, fill_string_nulls, get_dtype_category, is_datetime_dtype,
    is_numeric_dtype, is_text_dtype,
};
