//! Timestamp parsing for temporal columns.
//!
//! Values are matched against a fixed table of shapes and parsed with the
//! corresponding chrono format. Anything that matches no shape becomes null;
//! the caller decides what nulls mean.

use crate::utils::{f64_values, is_numeric_dtype};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

struct TimestampFormat {
    shape: Regex,
    format: &'static str,
    date_only: bool,
}

// Shape regexes compiled once at startup. Order matters: the first matching
// shape wins, so datetime shapes come before their date-only prefixes.
static TIMESTAMP_FORMATS: Lazy<Vec<TimestampFormat>> = Lazy::new(|| {
    vec![
        TimestampFormat {
            shape: Regex::new(r"^\d{4}-\d{1,2}-\d{1,2} \d{1,2}:\d{2}:\d{2}$")
                .expect("Invalid regex: datetime"),
            format: "%Y-%m-%d %H:%M:%S",
            date_only: false,
        },
        TimestampFormat {
            shape: Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}T\d{1,2}:\d{2}:\d{2}$")
                .expect("Invalid regex: ISO datetime"),
            format: "%Y-%m-%dT%H:%M:%S",
            date_only: false,
        },
        TimestampFormat {
            shape: Regex::new(r"^\d{4}-\d{1,2}-\d{1,2} \d{1,2}:\d{2}$")
                .expect("Invalid regex: datetime minutes"),
            format: "%Y-%m-%d %H:%M",
            date_only: false,
        },
        TimestampFormat {
            shape: Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("Invalid regex: date"),
            format: "%Y-%m-%d",
            date_only: true,
        },
        TimestampFormat {
            shape: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}$")
                .expect("Invalid regex: US datetime"),
            format: "%m/%d/%Y %H:%M",
            date_only: false,
        },
        TimestampFormat {
            shape: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid regex: US date"),
            format: "%m/%d/%Y",
            date_only: true,
        },
    ]
});

/// Parse one raw value into epoch milliseconds. Date-only values land at
/// midnight. Returns `None` for anything that matches no known shape.
pub(crate) fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for tf in TIMESTAMP_FORMATS.iter() {
        if !tf.shape.is_match(trimmed) {
            continue;
        }
        if tf.date_only {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, tf.format) {
                return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
            }
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, tf.format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    None
}

/// Convert a series to millisecond datetimes.
///
/// Strings go through the format table, numerics are treated as epoch
/// seconds or milliseconds by magnitude, datetimes pass through untouched.
/// Any other dtype becomes an all-null datetime column.
pub(crate) fn to_datetime(series: &Series) -> PolarsResult<Series> {
    match series.dtype() {
        DataType::Datetime(_, _) => Ok(series.clone()),
        DataType::String => {
            let values = series.str()?;
            let mut millis: Vec<Option<i64>> = Vec::with_capacity(values.len());
            for opt_val in values.into_iter() {
                millis.push(opt_val.and_then(parse_timestamp_ms));
            }
            Series::new(series.name().clone(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        }
        dtype if is_numeric_dtype(dtype) => {
            let values = f64_values(series)?;
            let mut millis: Vec<Option<i64>> = Vec::with_capacity(values.len());
            for opt_val in values {
                millis.push(opt_val.and_then(epoch_to_ms));
            }
            Series::new(series.name().clone(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        }
        _ => {
            let millis: Vec<Option<i64>> = vec![None; series.len()];
            Series::new(series.name().clone(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        }
    }
}

/// Plausible epoch ranges: 2001..2033 in seconds or milliseconds.
fn epoch_to_ms(value: f64) -> Option<i64> {
    let v = value as i64;
    if (1_000_000_000..2_000_000_000).contains(&v) {
        Some(v * 1000)
    } else if (1_000_000_000_000..2_000_000_000_000).contains(&v) {
        Some(v)
    } else {
        None
    }
}
