//! Shared utilities for the analytics pipeline.
//!
//! Dtype classification, null-fill primitives used by the record cleaner, and
//! the column views (floats, id keys, epoch timestamps) that the linker and
//! the aggregation engine reduce over.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    Text,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if is_text_dtype(dtype) {
        DtypeCategory::Text
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The output is always Float64, which is what the cleaning policy wants for
/// measure columns (cost, distance, battery level).
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let mask = series.is_null();
    let len = series.len();
    let mut result_vec = Vec::with_capacity(len);

    for i in 0..len {
        if mask.get(i).unwrap_or(false) {
            result_vec.push(Some(fill_value));
        } else {
            let val = series.get(i)?;
            result_vec.push(Some(val.try_extract::<f64>()?));
        }
    }

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Fill null values in a text Series with a specific sentinel.
///
/// Goes through the string accessor rather than `AnyValue` formatting, which
/// would wrap every non-null value in quotes.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let as_string = series.cast(&DataType::String)?;
    let filled: Vec<String> = as_string
        .str()?
        .into_iter()
        .map(|v| v.map_or_else(|| fill_value.to_string(), |s| s.to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Column View Utilities
// =============================================================================

/// View a column as `f64` values, nulls preserved.
///
/// Integer columns are widened; string columns are parsed, with unparseable
/// entries becoming null.
pub fn f64_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// View an id column as canonical string keys, nulls preserved.
///
/// Integer and float id columns render as integers ("5", not "5.0") so the
/// same station reads identically whether the CSV carried `5` or `5.0`;
/// string ids pass through untouched.
pub fn id_keys(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    match series.dtype() {
        dt if is_numeric_dtype(dt) => {
            let ints = series.cast(&DataType::Int64)?;
            Ok(ints
                .i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect())
        }
        _ => string_values(series),
    }
}

/// View a column as strings, nulls preserved. Non-string columns are cast.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let as_string = series.cast(&DataType::String)?;
    Ok(as_string
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// View a temporal column as epoch milliseconds, nulls preserved.
///
/// Normalizes through `Datetime(ms)` first so date columns and other time
/// units read consistently.
pub fn timestamps_ms(series: &Series) -> PolarsResult<Vec<Option<i64>>> {
    let ms = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    Ok(ms.i64()?.into_iter().collect())
}

// =============================================================================
// Tests
// =============================================================================
