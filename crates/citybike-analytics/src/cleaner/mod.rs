//! Record cleaning for the raw CSV tables.
//!
//! One fixed policy, applied in order:
//! 1. Drop exact duplicate rows, keeping the first occurrence
//! 2. Parse temporal columns (names containing "date"/"time") into datetimes
//! 3. Fill missing `cost` with 0
//! 4. Fill missing `battery_level` with the column mean
//! 5. Drop rows with negative `distance_km`
//! 6. Fill remaining nulls: numeric with 0, text with "Unknown"
//! 7. Drop trips whose `end_time` is not after `start_time`
//!
//! Datetime and boolean columns keep their nulls through step 6, so a trip
//! with an unparseable start or end survives until step 7 drops it there.

mod schema;
mod timestamps;

pub use schema::SchemaHints;

use crate::error::Result;
use crate::utils::{
    DtypeCategory, f64_values, fill_numeric_nulls, fill_string_nulls, get_dtype_category,
    timestamps_ms,
};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// What cleaning did to one table.
#[derive(Debug, Clone, Serialize)]
pub struct CleanOutcome {
    pub dataset: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub dropped_rows: usize,
    pub actions: Vec<String>,
}

/// Run the cleaning policy over one raw table.
///
/// Returns the cleaned frame and an audit of what happened. The policy is
/// schema-tolerant: steps that target a column the table does not have are
/// skipped, so the same function serves stations, trips, and maintenance.
pub fn clean_dataset(df: DataFrame, label: &str) -> Result<(DataFrame, CleanOutcome)> {
    let mut df = df;
    let mut actions = Vec::new();
    let rows_before = df.height();
    let hints = SchemaHints::probe(&df);

    info!("Cleaning {} table ({} rows)...", label, rows_before);

    // 1. Drop exact duplicate rows, keeping the first occurrence
    let before = df.height();
    df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let duplicates = before - df.height();
    if duplicates > 0 {
        actions.push(format!("Removed {} duplicate rows", duplicates));
        debug!("Removed {} duplicate rows", duplicates);
    } else {
        actions.push("No duplicate rows found".to_string());
    }

    // 2. Temporal columns become millisecond datetimes; unparseable -> null
    for name in &hints.temporal_columns {
        let series = df.column(name)?.as_materialized_series().clone();
        let nulls_before = series.null_count();
        let converted = timestamps::to_datetime(&series)?;
        let unparsed = converted.null_count().saturating_sub(nulls_before);
        df.replace(name.as_str(), converted)?;
        if unparsed > 0 {
            actions.push(format!(
                "Parsed '{}' as datetime ({} unparseable values set to null)",
                name, unparsed
            ));
        } else {
            actions.push(format!("Parsed '{}' as datetime", name));
        }
    }

    // 3. A missing cost is zero spend. The cast parses string-typed cost
    //    columns, so a value that fails the parse counts as missing too.
    if hints.has_cost {
        let floats = df
            .column("cost")?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let nulls = floats.null_count();
        df.replace("cost", fill_numeric_nulls(&floats, 0.0)?)?;
        if nulls > 0 {
            actions.push(format!("Filled {} missing cost values with 0", nulls));
        }
    }

    // 4. Missing battery levels get the column mean, computed before the
    //    fill; an all-null column falls back to 0
    if hints.has_battery_level {
        let floats = df
            .column("battery_level")?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let nulls = floats.null_count();
        let mean = floats.mean().unwrap_or(0.0);
        df.replace("battery_level", fill_numeric_nulls(&floats, mean)?)?;
        if nulls > 0 {
            actions.push(format!(
                "Filled {} missing battery_level values with mean {:.2}",
                nulls, mean
            ));
        }
    }

    // 5. Keep rows with distance_km >= 0; negative and null both fail
    if hints.has_distance_km {
        let values = f64_values(df.column("distance_km")?.as_materialized_series())?;
        let keep: Vec<bool> = values
            .iter()
            .map(|v| v.map(|d| d >= 0.0).unwrap_or(false))
            .collect();
        let before = df.height();
        df = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        let dropped = before - df.height();
        if dropped > 0 {
            actions.push(format!(
                "Dropped {} rows with invalid distance_km",
                dropped
            ));
            debug!("Dropped {} rows with invalid distance_km", dropped);
        }
    }

    // 6. Remaining nulls: numeric -> 0, text -> "Unknown"; datetime and
    //    boolean columns keep theirs
    let columns: Vec<(String, DtypeCategory, usize)> = df
        .get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            (
                series.name().to_string(),
                get_dtype_category(series.dtype()),
                series.null_count(),
            )
        })
        .collect();

    let mut zero_filled = Vec::new();
    let mut unknown_filled = Vec::new();
    for (name, category, nulls) in columns {
        if nulls == 0 {
            continue;
        }
        match category {
            DtypeCategory::Numeric => {
                let series = df.column(&name)?.as_materialized_series().clone();
                df.replace(name.as_str(), fill_numeric_nulls(&series, 0.0)?)?;
                zero_filled.push(name);
            }
            DtypeCategory::Text => {
                let series = df.column(&name)?.as_materialized_series().clone();
                df.replace(name.as_str(), fill_string_nulls(&series, "Unknown")?)?;
                unknown_filled.push(name);
            }
            _ => {}
        }
    }
    if !zero_filled.is_empty() {
        actions.push(format!("Filled numeric nulls with 0 in: {:?}", zero_filled));
    }
    if !unknown_filled.is_empty() {
        actions.push(format!(
            "Filled text nulls with 'Unknown' in: {:?}",
            unknown_filled
        ));
    }

    // 7. A trip must end after it starts; a null endpoint fails the check
    if hints.has_trip_window {
        let starts = timestamps_ms(df.column("start_time")?.as_materialized_series())?;
        let ends = timestamps_ms(df.column("end_time")?.as_materialized_series())?;
        let keep: Vec<bool> = starts
            .iter()
            .copied()
            .zip(ends.iter().copied())
            .map(|window| match window {
                (Some(start), Some(end)) => end > start,
                _ => false,
            })
            .collect();
        let before = df.height();
        df = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        let dropped = before - df.height();
        if dropped > 0 {
            actions.push(format!(
                "Dropped {} trips with end_time <= start_time",
                dropped
            ));
            debug!("Dropped {} trips with end_time <= start_time", dropped);
        }
    }

    let rows_after = df.height();
    let dropped_rows = rows_before - rows_after;
    info!(
        "Cleaned {}: {} -> {} rows ({} dropped)",
        label, rows_before, rows_after, dropped_rows
    );

    Ok((
        df,
        CleanOutcome {
            dataset: label.to_string(),
            rows_before,
            rows_after,
            dropped_rows,
            actions,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_f64(df: &DataFrame, col: &str, idx: usize) -> f64 {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .get(idx)
            .unwrap()
            .try_extract::<f64>()
            .unwrap()
    }

    fn get_str(df: &DataFrame, col: &str, idx: usize) -> String {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .get(idx)
            .unwrap()
            .to_string()
    }

    // ========================================================================
    // individual policy steps
    // ========================================================================

    #[test]
    fn test_duplicates_dropped_keeping_first() {
        // Same trip_id is not enough; only fully identical rows are duplicates
        let df = df!(
            "trip_id" => &[1i64, 2, 1, 3],
            "note" => &["a", "b", "x", "c"],
        )
        .unwrap();

        let (cleaned, outcome) = clean_dataset(df, "trips").unwrap();
        assert_eq!(cleaned.height(), 4);
        assert_eq!(outcome.dropped_rows, 0);

        let df = df!(
            "trip_id" => &[1i64, 1, 2],
            "note" => &["a", "a", "b"],
        )
        .unwrap();
        let (cleaned, outcome) = clean_dataset(df, "trips").unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(outcome.dropped_rows, 1);
        // First occurrence order is preserved
        assert_eq!(get_str(&cleaned, "note", 0), "a");
        assert_eq!(get_str(&cleaned, "note", 1), "b");
    }

    #[test]
    fn test_temporal_columns_parsed_and_bad_values_nulled() {
        let df = df!(
            "record_id" => &[1i64, 2],
            "maintenance_date" => &["2024-03-15", "soon"],
            "cost" => &[10.0, 20.0],
        )
        .unwrap();

        let (cleaned, outcome) = clean_dataset(df, "maintenance").unwrap();
        let date_col = cleaned
            .column("maintenance_date")
            .unwrap()
            .as_materialized_series()
            .clone();
        assert!(matches!(date_col.dtype(), DataType::Datetime(_, _)));
        assert_eq!(date_col.null_count(), 1);
        // Rows with bad dates survive; only trip windows drop rows on time
        assert_eq!(cleaned.height(), 2);
        assert!(
            outcome
                .actions
                .iter()
                .any(|a| a.contains("maintenance_date"))
        );
    }

    #[test]
    fn test_missing_cost_becomes_zero() {
        let df = df!(
            "record_id" => &[1i64, 2],
            "cost" => &[Some(12.5), None],
        )
        .unwrap();

        let (cleaned, _) = clean_dataset(df, "maintenance").unwrap();
        assert_eq!(get_f64(&cleaned, "cost", 1), 0.0);
    }

    #[test]
    fn test_string_typed_cost_column_is_coerced() {
        // Capped schema inference can leave a dirty cost column as text
        let df = df!(
            "record_id" => &[1i64, 2, 3],
            "cost" => &["12.50", "junk", ""],
        )
        .unwrap();

        let (cleaned, _) = clean_dataset(df, "maintenance").unwrap();
        let cost = cleaned.column("cost").unwrap().as_materialized_series().clone();
        assert_eq!(cost.dtype(), &DataType::Float64);
        assert_eq!(get_f64(&cleaned, "cost", 0), 12.5);
        assert_eq!(get_f64(&cleaned, "cost", 1), 0.0);
        assert_eq!(get_f64(&cleaned, "cost", 2), 0.0);
    }

    #[test]
    fn test_missing_battery_gets_pre_fill_mean() {
        let df = df!(
            "bike_id" => &[1i64, 2, 3],
            "battery_level" => &[Some(80.0), None, Some(60.0)],
        )
        .unwrap();

        let (cleaned, outcome) = clean_dataset(df, "bikes").unwrap();
        assert_eq!(get_f64(&cleaned, "battery_level", 1), 70.0);
        assert!(outcome.actions.iter().any(|a| a.contains("mean 70.00")));
    }

    #[test]
    fn test_all_null_battery_falls_back_to_zero() {
        let df = df!(
            "bike_id" => &[1i64, 2],
            "battery_level" => &[None::<f64>, None],
        )
        .unwrap();

        let (cleaned, _) = clean_dataset(df, "bikes").unwrap();
        assert_eq!(get_f64(&cleaned, "battery_level", 0), 0.0);
        assert_eq!(get_f64(&cleaned, "battery_level", 1), 0.0);
    }

    #[test]
    fn test_negative_and_null_distances_dropped() {
        let df = df!(
            "trip_id" => &[1i64, 2, 3, 4],
            "distance_km" => &[Some(2.5), Some(-1.0), None, Some(0.0)],
        )
        .unwrap();

        let (cleaned, outcome) = clean_dataset(df, "trips").unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(outcome.dropped_rows, 2);
        assert_eq!(get_f64(&cleaned, "distance_km", 0), 2.5);
        assert_eq!(get_f64(&cleaned, "distance_km", 1), 0.0);
    }

    #[test]
    fn test_remaining_nulls_filled_by_category() {
        let df = df!(
            "station_id" => &[1i64, 2],
            "station_name" => &[Some("Central"), None],
            "capacity" => &[Some(20i64), None],
        )
        .unwrap();

        let (cleaned, _) = clean_dataset(df, "stations").unwrap();
        assert_eq!(get_str(&cleaned, "station_name", 1), "Unknown");
        assert_eq!(get_f64(&cleaned, "capacity", 1), 0.0);
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_invalid_trip_windows_dropped() {
        let df = df!(
            "trip_id" => &[1i64, 2, 3, 4],
            "start_time" => &[
                "2024-01-01 08:00:00",
                "2024-01-01 09:00:00",
                "2024-01-01 10:00:00",
                "2024-01-01 11:00:00",
            ],
            "end_time" => &[
                "2024-01-01 08:30:00", // valid
                "2024-01-01 09:00:00", // equal, dropped
                "2024-01-01 09:15:00", // ends before start, dropped
                "whenever",            // unparseable, dropped
            ],
        )
        .unwrap();

        let (cleaned, outcome) = clean_dataset(df, "trips").unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(outcome.dropped_rows, 3);
        assert!(
            outcome
                .actions
                .iter()
                .any(|a| a.contains("end_time <= start_time"))
        );
    }

    #[test]
    fn test_null_start_time_survives_fill_but_fails_window() {
        // Nulls in datetime columns are not filled by step 6; the window
        // check is what removes them
        let df = df!(
            "trip_id" => &[1i64, 2],
            "start_time" => &[Some("2024-01-01 08:00:00"), None],
            "end_time" => &["2024-01-01 08:30:00", "2024-01-01 09:00:00"],
            "distance_km" => &[1.0, 2.0],
        )
        .unwrap();

        let (cleaned, _) = clean_dataset(df, "trips").unwrap();
        assert_eq!(cleaned.height(), 1);
    }

    // ========================================================================
    // whole-policy behavior
    // ========================================================================

    #[test]
    fn test_cleaning_is_idempotent() {
        let df = df!(
            "trip_id" => &[1i64, 1, 2, 3],
            "start_time" => &[
                "2024-01-01 08:00:00",
                "2024-01-01 08:00:00",
                "2024-01-02 09:00:00",
                "2024-01-03 10:00:00",
            ],
            "end_time" => &[
                "2024-01-01 08:30:00",
                "2024-01-01 08:30:00",
                "2024-01-02 08:00:00",
                "2024-01-03 10:45:00",
            ],
            "distance_km" => &[Some(2.0), Some(2.0), Some(3.0), None],
        )
        .unwrap();

        let (first_pass, first) = clean_dataset(df, "trips").unwrap();
        assert!(first.dropped_rows > 0);

        let (second_pass, second) = clean_dataset(first_pass.clone(), "trips").unwrap();
        assert_eq!(second.dropped_rows, 0);
        assert_eq!(second_pass.shape(), first_pass.shape());
    }

    #[test]
    fn test_empty_frame_is_fine() {
        let df = df!(
            "trip_id" => &Vec::<i64>::new(),
            "distance_km" => &Vec::<f64>::new(),
        )
        .unwrap();

        let (cleaned, outcome) = clean_dataset(df, "trips").unwrap();
        assert_eq!(cleaned.height(), 0);
        assert_eq!(outcome.dropped_rows, 0);
        assert_eq!(outcome.rows_before, 0);
    }

    #[test]
    fn test_outcome_row_accounting() {
        let df = df!(
            "trip_id" => &[1i64, 1, 2, 3],
            "distance_km" => &[1.0, 1.0, -5.0, 2.0],
        )
        .unwrap();

        let (cleaned, outcome) = clean_dataset(df, "trips").unwrap();
        assert_eq!(outcome.rows_before, 4);
        assert_eq!(outcome.rows_after, 2);
        assert_eq!(outcome.dropped_rows, 2);
        assert_eq!(cleaned.height(), outcome.rows_after);
    }
}
