//! Maintenance cost rollups.

use crate::error::Result;
use crate::linker::BikeTypes;
use crate::utils::{f64_values, id_keys};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Total spend across the maintenance log.
pub fn total_maintenance_cost(df: &DataFrame) -> Result<f64> {
    let Ok(col) = df.column("cost") else {
        return Ok(0.0);
    };
    Ok(f64_values(col.as_materialized_series())?
        .into_iter()
        .flatten()
        .sum())
}

/// Spend per bike type, resolved through the trips-derived bike registry.
///
/// A log without a `bike_id` column attributes everything to `"Unknown"`,
/// as do rows whose bike never appears in the trips table.
pub fn maintenance_cost_by_bike_type(
    df: &DataFrame,
    bikes: &BikeTypes,
) -> Result<BTreeMap<String, f64>> {
    let mut by_type = BTreeMap::new();
    let Ok(cost_col) = df.column("cost") else {
        return Ok(by_type);
    };
    let costs = f64_values(cost_col.as_materialized_series())?;

    let ids = match df.column("bike_id") {
        Ok(col) => id_keys(col.as_materialized_series())?,
        Err(_) => {
            debug!("maintenance table has no bike_id column; attributing all costs to Unknown");
            vec![None; costs.len()]
        }
    };

    for (id, cost) in ids.into_iter().zip(costs.into_iter()) {
        let Some(cost) = cost else { continue };
        let bike_type = id.as_deref().map(|id| bikes.resolve(id)).unwrap_or("Unknown");
        *by_type.entry(bike_type.to_string()).or_insert(0.0) += cost;
    }

    Ok(by_type)
}
