//! Dataset loading.
//!
//! One function, one failure mode: a file that is missing or cannot be parsed
//! into a table at all surfaces as [`AnalyticsError::DatasetNotFound`] with
//! the offending path. Everything recoverable about dirty data is the record
//! cleaner's job, not the loader's.

use crate::error::{AnalyticsError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Load one dataset CSV into a DataFrame.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(AnalyticsError::DatasetNotFound {
            path: path.display().to_string(),
        });
    }

    let df = read_csv(path).map_err(|e| {
        debug!("CSV read failed for {}: {}", path.display(), e);
        AnalyticsError::DatasetNotFound {
            path: path.display().to_string(),
        }
    })?;

    info!(
        "Loaded {}: {} rows x {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Read a CSV with a quote-aware pass first, then a plain pass.
///
/// Schema inference is capped at 100 rows; columns that mix junk into numeric
/// data therefore come back as strings. The cleaner parses those per value in
/// the steps that read them, so the loader never retypes columns itself.
fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    let quoted = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish();

    match quoted {
        Ok(df) => Ok(df),
        Err(e) => {
            debug!("Quoted read failed for {}: {}", path.display(), e);
            CsvReadOptions::default()
                .with_infer_schema_length(Some(100))
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()
        }
    }
}
