//! Business metrics over the cleaned tables.
//!
//! [`compute_business_stats`] is the single aggregation entry point; the
//! submodules hold the individual metric functions it assembles.

pub mod descriptive;
pub mod maintenance;
pub mod rankings;
pub mod trips;

pub use descriptive::DescriptiveStats;
pub use rankings::{RouteActivity, StationActivity, UserActivity};
pub use trips::ensure_derived_columns;

use crate::error::Result;
use crate::linker::{BikeTypes, StationNames};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Everything the report layer needs, computed in one pass.
///
/// Grouped metrics use ordered maps so serialized output is deterministic;
/// rankings are vectors in rank order.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessStats {
    pub total_trips: usize,
    pub total_distance_km: f64,
    pub avg_distance_km: f64,
    pub avg_duration_minutes: f64,
    pub distance_distribution: DescriptiveStats,
    pub top_start_stations: Vec<StationActivity>,
    pub top_end_stations: Vec<StationActivity>,
    pub peak_hour: Option<u32>,
    pub busiest_day: Option<String>,
    pub avg_distance_by_user_type: BTreeMap<String, f64>,
    pub utilization_rate_pct: f64,
    pub monthly_trend: BTreeMap<String, usize>,
    pub top_users: Vec<UserActivity>,
    pub maintenance_cost_by_bike_type: BTreeMap<String, f64>,
    pub total_maintenance_cost: f64,
    pub top_routes: Vec<RouteActivity>,
    pub avg_trips_per_user_by_type: BTreeMap<String, f64>,
}

/// Compute the full metric set.
///
/// Expects cleaned tables with derived trip columns already in place (see
/// [`ensure_derived_columns`]); lookups come from the linker so station
/// names and bike types stay consistent across metrics.
pub fn compute_business_stats(
    trips_df: &DataFrame,
    maintenance_df: &DataFrame,
    stations: &StationNames,
    bikes: &BikeTypes,
) -> Result<BusinessStats> {
    info!(
        "Computing business metrics over {} trips and {} maintenance records",
        trips_df.height(),
        maintenance_df.height()
    );

    Ok(BusinessStats {
        total_trips: trips::total_trips(trips_df),
        total_distance_km: trips::total_distance_km(trips_df)?,
        avg_distance_km: trips::avg_distance_km(trips_df)?,
        avg_duration_minutes: trips::avg_duration_minutes(trips_df)?,
        distance_distribution: trips::distance_distribution(trips_df)?,
        top_start_stations: rankings::top_stations(
            trips_df,
            "start_station_id",
            stations,
            rankings::TOP_STATIONS,
        )?,
        top_end_stations: rankings::top_stations(
            trips_df,
            "end_station_id",
            stations,
            rankings::TOP_STATIONS,
        )?,
        peak_hour: trips::peak_hour(trips_df)?,
        busiest_day: trips::busiest_day(trips_df)?,
        avg_distance_by_user_type: trips::avg_distance_by_user_type(trips_df)?,
        utilization_rate_pct: trips::utilization_rate_pct(trips_df)?,
        monthly_trend: trips::monthly_trend(trips_df)?,
        top_users: rankings::top_users(trips_df, rankings::TOP_USERS)?,
        maintenance_cost_by_bike_type: maintenance::maintenance_cost_by_bike_type(
            maintenance_df,
            bikes,
        )?,
        total_maintenance_cost: maintenance::total_maintenance_cost(maintenance_df)?,
        top_routes: rankings::top_routes(trips_df, stations, rankings::TOP_ROUTES)?,
        avg_trips_per_user_by_type: trips::avg_trips_per_user_by_type(trips_df)?,
    })
}
