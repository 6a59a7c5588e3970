//! Schema probing for cleaning decisions.
//!
//! Column presence is resolved once per table, up front, and the answers are
//! carried through the cleaning steps. The steps themselves never re-inspect
//! the frame for optional columns.

use polars::prelude::*;

/// Column name fragments that mark a column as temporal.
const TEMPORAL_MARKERS: [&str; 2] = ["date", "time"];

/// Resolved answers to the schema questions the cleaning policy asks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaHints {
    /// Columns whose names contain "date" or "time" (case-insensitive),
    /// in frame order.
    pub temporal_columns: Vec<String>,
    pub has_cost: bool,
    pub has_battery_level: bool,
    pub has_distance_km: bool,
    /// Both `start_time` and `end_time` are present.
    pub has_trip_window: bool,
}

impl SchemaHints {
    /// Probe a frame once. Cleaning steps consult the result instead of
    /// checking the schema themselves.
    pub fn probe(df: &DataFrame) -> Self {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let temporal_columns = names
            .iter()
            .filter(|name| {
                let lower = name.to_lowercase();
                TEMPORAL_MARKERS.iter().any(|marker| lower.contains(marker))
            })
            .cloned()
            .collect();

        let has = |col: &str| names.iter().any(|n| n == col);

        SchemaHints {
            temporal_columns,
            has_cost: has("cost"),
            has_battery_level: has("battery_level"),
            has_distance_km: has("distance_km"),
            has_trip_window: has("start_time") && has("end_time"),
        }
    }

    pub fn is_temporal(&self, name: &str) -> bool {
        self.temporal_columns.iter().any(|c| c == name)
    }
}
