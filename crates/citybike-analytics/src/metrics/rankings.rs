//! Top-N rankings over first-seen counts.
//!
//! Counting preserves the order keys first appear in the data and the sort
//! is stable, so tied entries rank in data order. Every ranking goes
//! through [`top_n_by_count`]; there is no second ranking path.

use crate::error::Result;
use crate::linker::StationNames;
use crate::ordering::merge_sort_by_key;
use crate::utils::id_keys;
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;

pub const TOP_STATIONS: usize = 10;
pub const TOP_USERS: usize = 15;
pub const TOP_ROUTES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationActivity {
    pub station_id: String,
    pub station_name: String,
    pub trip_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserActivity {
    pub user_id: String,
    pub trip_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteActivity {
    pub start_station_id: String,
    pub start_station_name: String,
    pub end_station_id: String,
    pub end_station_name: String,
    pub trip_count: usize,
}

/// Count occurrences, remembering the order keys first appeared.
pub(crate) fn count_first_seen<K>(keys: impl IntoIterator<Item = Option<K>>) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
{
    let mut order: Vec<(K, usize)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for key in keys.into_iter().flatten() {
        match index.get(&key) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }
    order
}

/// Highest counts first; ties keep their first-seen order.
pub(crate) fn top_n_by_count<K: Clone>(counts: &[(K, usize)], n: usize) -> Vec<(K, usize)> {
    merge_sort_by_key(counts, |(_, count)| Reverse(*count))
        .into_iter()
        .take(n)
        .collect()
}

/// Busiest stations by one endpoint column (`start_station_id` or
/// `end_station_id`), annotated with display names.
pub fn top_stations(
    df: &DataFrame,
    column: &str,
    names: &StationNames,
    limit: usize,
) -> Result<Vec<StationActivity>> {
    let Ok(col) = df.column(column) else {
        return Ok(Vec::new());
    };
    let counts = count_first_seen(id_keys(col.as_materialized_series())?);
    Ok(top_n_by_count(&counts, limit)
        .into_iter()
        .map(|(station_id, trip_count)| StationActivity {
            station_name: names.resolve(&station_id),
            station_id,
            trip_count,
        })
        .collect())
}

/// Most active riders by trip count.
pub fn top_users(df: &DataFrame, limit: usize) -> Result<Vec<UserActivity>> {
    let Ok(col) = df.column("user_id") else {
        return Ok(Vec::new());
    };
    let counts = count_first_seen(id_keys(col.as_materialized_series())?);
    Ok(top_n_by_count(&counts, limit)
        .into_iter()
        .map(|(user_id, trip_count)| UserActivity {
            user_id,
            trip_count,
        })
        .collect())
}

/// Most ridden directed station pairs. A trip needs both endpoints to
/// count toward a route.
pub fn top_routes(
    df: &DataFrame,
    names: &StationNames,
    limit: usize,
) -> Result<Vec<RouteActivity>> {
    let (Ok(start_col), Ok(end_col)) = (df.column("start_station_id"), df.column("end_station_id"))
    else {
        return Ok(Vec::new());
    };
    let starts = id_keys(start_col.as_materialized_series())?;
    let ends = id_keys(end_col.as_materialized_series())?;
    let pairs = starts
        .into_iter()
        .zip(ends.into_iter())
        .map(|pair| match pair {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        });

    let counts = count_first_seen(pairs);
    Ok(top_n_by_count(&counts, limit)
        .into_iter()
        .map(|((start, end), trip_count)| RouteActivity {
            start_station_name: names.resolve(&start),
            end_station_name: names.resolve(&end),
            start_station_id: start,
            end_station_id: end,
            trip_count,
        })
        .collect())
}
