//! Cross-table keys: station names for trips, bike types for maintenance.
//!
//! Station ids and bike ids arrive as whatever the CSVs used (integers,
//! floats, strings), so both lookups key on the canonical string form from
//! [`crate::utils::id_keys`].

use crate::error::Result;
use crate::models::{Station, extract_stations};
use crate::ordering::{binary_search_by_key, merge_sort_by_key};
use crate::utils::{id_keys, string_values};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Station id to display name, resolved against the stations table.
///
/// Entries are held sorted by id and answered by binary search; when the
/// stations table carries the same id twice, the earlier row wins.
#[derive(Debug, Clone)]
pub struct StationNames {
    entries: Vec<(String, String)>,
}

impl StationNames {
    pub fn from_stations(stations: &[Station]) -> Self {
        let pairs: Vec<(String, String)> = stations
            .iter()
            .map(|s| (s.station_id.clone(), s.name.clone()))
            .collect();
        // Stable sort keeps table order among equal ids, so the search
        // lands on the first-in-table entry
        let entries = merge_sort_by_key(&pairs, |(id, _)| id.clone());
        StationNames { entries }
    }

    pub fn from_table(df: &DataFrame) -> Result<Self> {
        Ok(Self::from_stations(&extract_stations(df)?))
    }

    /// Display name for a station id, synthesized when the id is unknown.
    pub fn resolve(&self, station_id: &str) -> String {
        binary_search_by_key(&self.entries, &station_id.to_string(), |(id, _)| id.clone())
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| format!("Station {}", station_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bike id to bike type, learned from the trips table.
///
/// The fleet has no roster file, so the first trip that mentions a bike
/// decides its type. Unknown bikes resolve to `"Unknown"`.
#[derive(Debug, Clone, Default)]
pub struct BikeTypes {
    by_bike: HashMap<String, String>,
}

impl BikeTypes {
    pub fn from_trips(df: &DataFrame) -> Result<Self> {
        let mut by_bike = HashMap::new();
        let (Ok(id_col), Ok(type_col)) = (df.column("bike_id"), df.column("bike_type")) else {
            debug!("trips table lacks bike_id/bike_type; bike lookups will resolve to Unknown");
            return Ok(BikeTypes { by_bike });
        };

        let ids = id_keys(id_col.as_materialized_series())?;
        let types = string_values(type_col.as_materialized_series())?;
        for (id, bike_type) in ids.into_iter().zip(types.into_iter()) {
            if let (Some(id), Some(bike_type)) = (id, bike_type) {
                by_bike.entry(id).or_insert(bike_type);
            }
        }

        Ok(BikeTypes { by_bike })
    }

    pub fn resolve(&self, bike_id: &str) -> &str {
        self.by_bike
            .get(bike_id)
            .map(|s| s.as_str())
            .unwrap_or("Unknown")
    }

    pub fn len(&self) -> usize {
        self.by_bike.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bike.is_empty()
    }
}
