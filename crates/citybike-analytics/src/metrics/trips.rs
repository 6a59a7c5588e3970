//! Trip metrics: volumes, averages, temporal patterns, fleet utilization.
//!
//! Everything here runs over the cleaned trips table. Functions are
//! schema-tolerant: a metric whose columns are missing reports its empty
//! value (zero, `None`, or an empty map) instead of erroring, so partial
//! datasets still produce a report.

use crate::error::Result;
use crate::metrics::descriptive::{DescriptiveStats, describe};
use crate::utils::{f64_values, id_keys, string_values, timestamps_ms};
use chrono::{DateTime, Timelike, Utc};
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Derive `duration_minutes` and `month_year` from the trip window.
///
/// Idempotent: existing columns are left alone, and tables without the
/// time columns pass through unchanged. Trips with a null endpoint get a
/// null duration.
pub fn ensure_derived_columns(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let has = |col: &str| names.iter().any(|n| n == col);

    if !has("duration_minutes") && has("start_time") && has("end_time") {
        let starts = timestamps_ms(df.column("start_time")?.as_materialized_series())?;
        let ends = timestamps_ms(df.column("end_time")?.as_materialized_series())?;
        let minutes: Vec<Option<f64>> = starts
            .iter()
            .copied()
            .zip(ends.iter().copied())
            .map(|window| match window {
                (Some(start), Some(end)) => Some((end - start) as f64 / 60_000.0),
                _ => None,
            })
            .collect();
        df.with_column(Series::new("duration_minutes".into(), minutes))?;
        debug!("Derived duration_minutes for {} trips", df.height());
    }

    if !has("month_year") && has("start_time") {
        let starts = timestamps_ms(df.column("start_time")?.as_materialized_series())?;
        let months: Vec<Option<String>> = starts
            .iter()
            .copied()
            .map(|ms| ms.and_then(month_key))
            .collect();
        df.with_column(Series::new("month_year".into(), months))?;
    }

    Ok(df)
}

fn month_key(ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.format("%Y-%m").to_string())
}

pub fn total_trips(df: &DataFrame) -> usize {
    df.height()
}

pub fn total_distance_km(df: &DataFrame) -> Result<f64> {
    column_sum(df, "distance_km")
}

pub fn avg_distance_km(df: &DataFrame) -> Result<f64> {
    column_mean(df, "distance_km")
}

pub fn avg_duration_minutes(df: &DataFrame) -> Result<f64> {
    column_mean(df, "duration_minutes")
}

/// Distribution of `distance_km` across the cleaned trips.
pub fn distance_distribution(df: &DataFrame) -> Result<DescriptiveStats> {
    let Ok(col) = df.column("distance_km") else {
        return Ok(describe(&[]));
    };
    Ok(describe(&f64_values(col.as_materialized_series())?))
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let Ok(col) = df.column(name) else {
        return Ok(Vec::new());
    };
    Ok(f64_values(col.as_materialized_series())?
        .into_iter()
        .flatten()
        .collect())
}

fn column_sum(df: &DataFrame, name: &str) -> Result<f64> {
    Ok(column_values(df, name)?.iter().sum())
}

fn column_mean(df: &DataFrame, name: &str) -> Result<f64> {
    let values = column_values(df, name)?;
    if values.is_empty() {
        return Ok(0.0);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Hour of day (0-23) with the most trip starts. Ties break toward the
/// earlier hour; a table with no usable start times has no peak.
pub fn peak_hour(df: &DataFrame) -> Result<Option<u32>> {
    let Ok(col) = df.column("start_time") else {
        return Ok(None);
    };
    let starts = timestamps_ms(col.as_materialized_series())?;

    let mut counts = [0usize; 24];
    for ms in starts.into_iter().flatten() {
        if let Some(dt) = DateTime::<Utc>::from_timestamp_millis(ms) {
            counts[dt.hour() as usize] += 1;
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for (hour, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        if best.map(|(_, top)| count > top).unwrap_or(true) {
            best = Some((hour as u32, count));
        }
    }
    Ok(best.map(|(hour, _)| hour))
}

/// Full weekday name with the most trip starts; alphabetical on ties.
pub fn busiest_day(df: &DataFrame) -> Result<Option<String>> {
    let Ok(col) = df.column("start_time") else {
        return Ok(None);
    };
    let starts = timestamps_ms(col.as_materialized_series())?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for ms in starts.into_iter().flatten() {
        if let Some(dt) = DateTime::<Utc>::from_timestamp_millis(ms) {
            *counts.entry(dt.format("%A").to_string()).or_insert(0) += 1;
        }
    }

    let mut best: Option<(&String, usize)> = None;
    for (day, &count) in &counts {
        if best.map(|(_, top)| count > top).unwrap_or(true) {
            best = Some((day, count));
        }
    }
    Ok(best.map(|(day, _)| day.clone()))
}

/// Trip counts keyed by `"%Y-%m"` start month. The keys sort
/// lexicographically, which for this format is chronological.
pub fn monthly_trend(df: &DataFrame) -> Result<BTreeMap<String, usize>> {
    let mut trend = BTreeMap::new();
    let Ok(col) = df.column("month_year") else {
        return Ok(trend);
    };
    for month in string_values(col.as_materialized_series())?
        .into_iter()
        .flatten()
    {
        *trend.entry(month).or_insert(0) += 1;
    }
    Ok(trend)
}

pub fn avg_distance_by_user_type(df: &DataFrame) -> Result<BTreeMap<String, f64>> {
    let (Ok(type_col), Ok(dist_col)) = (df.column("user_type"), df.column("distance_km")) else {
        return Ok(BTreeMap::new());
    };
    let types = string_values(type_col.as_materialized_series())?;
    let distances = f64_values(dist_col.as_materialized_series())?;

    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for pair in types.into_iter().zip(distances.into_iter()) {
        let (Some(user_type), Some(distance)) = pair else {
            continue;
        };
        let entry = totals.entry(user_type).or_insert((0.0, 0));
        entry.0 += distance;
        entry.1 += 1;
    }

    Ok(totals
        .into_iter()
        .map(|(user_type, (sum, n))| (user_type, sum / n as f64))
        .collect())
}

/// Share of total fleet-time spent on trips, as a percentage.
///
/// The denominator is distinct bikes times the span from the earliest
/// start to the latest end. Degenerate inputs (no trips, no bikes,
/// non-positive span) rate as zero.
pub fn utilization_rate_pct(df: &DataFrame) -> Result<f64> {
    if df.height() == 0 {
        return Ok(0.0);
    }
    let Ok(bike_col) = df.column("bike_id") else {
        return Ok(0.0);
    };
    let (Ok(start_col), Ok(end_col)) = (df.column("start_time"), df.column("end_time")) else {
        return Ok(0.0);
    };

    let bikes: HashSet<String> = id_keys(bike_col.as_materialized_series())?
        .into_iter()
        .flatten()
        .collect();
    if bikes.is_empty() {
        return Ok(0.0);
    }

    let starts = timestamps_ms(start_col.as_materialized_series())?;
    let ends = timestamps_ms(end_col.as_materialized_series())?;
    let first_start = starts.into_iter().flatten().min();
    let last_end = ends.into_iter().flatten().max();
    let (Some(first), Some(last)) = (first_start, last_end) else {
        return Ok(0.0);
    };
    let span_minutes = (last - first) as f64 / 60_000.0;
    if span_minutes <= 0.0 {
        return Ok(0.0);
    }

    let used_minutes = column_sum(df, "duration_minutes")?;
    Ok(used_minutes / (bikes.len() as f64 * span_minutes) * 100.0)
}

/// Trips per distinct user, split by user type. Types with no resolvable
/// users are omitted rather than divided by zero.
pub fn avg_trips_per_user_by_type(df: &DataFrame) -> Result<BTreeMap<String, f64>> {
    let (Ok(type_col), Ok(user_col)) = (df.column("user_type"), df.column("user_id")) else {
        return Ok(BTreeMap::new());
    };
    let types = string_values(type_col.as_materialized_series())?;
    let users = id_keys(user_col.as_materialized_series())?;

    let mut trip_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut distinct: BTreeMap<String, HashSet<String>> = BTreeMap::new();
    for (user_type, user_id) in types.into_iter().zip(users.into_iter()) {
        let Some(user_type) = user_type else { continue };
        *trip_counts.entry(user_type.clone()).or_insert(0) += 1;
        if let Some(user_id) = user_id {
            distinct.entry(user_type).or_default().insert(user_id);
        }
    }

    Ok(trip_counts
        .into_iter()
        .filter_map(|(user_type, trips)| {
            let users = distinct.get(&user_type).map(|s| s.len()).unwrap_or(0);
            (users > 0).then(|| (user_type, trips as f64 / users as f64))
        })
        .collect())
}
