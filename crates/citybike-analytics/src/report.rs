//! Report assembly: the text summary, the JSON stats document, and the
//! cleaned-table CSV exports.
//!
//! Rendering is split from writing so the layout can be tested without
//! touching the filesystem.

use crate::cleaner::CleanOutcome;
use crate::error::Result;
use crate::metrics::BusinessStats;
use chrono::Local;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write the human-readable summary to `summary_report.txt`.
    pub fn write_summary(
        &self,
        stats: &BusinessStats,
        outcomes: &[CleanOutcome],
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join("summary_report.txt");
        let mut file = File::create(&path)?;
        file.write_all(render_summary(stats, outcomes).as_bytes())?;

        info!("Summary report saved: {}", path.display());
        Ok(path)
    }

    /// Write the machine-readable stats to `business_stats.json`.
    pub fn write_json_stats(&self, stats: &BusinessStats) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join("business_stats.json");
        let mut file = File::create(&path)?;
        file.write_all(serde_json::to_string_pretty(stats)?.as_bytes())?;

        info!("Business stats saved: {}", path.display());
        Ok(path)
    }

    /// Export one cleaned table to `cleaned_{name}.csv`.
    pub fn export_cleaned(&self, name: &str, df: &mut DataFrame) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("cleaned_{}.csv", name));
        let mut file = File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)?;

        info!("Cleaned {} table exported: {}", name, path.display());
        Ok(path)
    }
}

/// Render the summary report. Floats print with two decimals; metrics with
/// no answer print "n/a".
pub fn render_summary(stats: &BusinessStats, outcomes: &[CleanOutcome]) -> String {
    let bar = "=".repeat(80);
    let rule = "-".repeat(80);
    let mut lines: Vec<String> = Vec::new();

    lines.push(bar.clone());
    lines.push("CITYBIKE SYSTEM SUMMARY REPORT".to_string());
    lines.push(format!(
        "Generated: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(bar);

    lines.push(String::new());
    lines.push("1. DATA CLEANING".to_string());
    lines.push(rule.clone());
    if outcomes.is_empty() {
        lines.push("  (no cleaning performed)".to_string());
    }
    for outcome in outcomes {
        lines.push(format!(
            "  {}: {} -> {} rows ({} dropped)",
            outcome.dataset, outcome.rows_before, outcome.rows_after, outcome.dropped_rows
        ));
        for action in &outcome.actions {
            lines.push(format!("    - {}", action));
        }
    }

    lines.push(String::new());
    lines.push("2. TRIP VOLUME".to_string());
    lines.push(rule.clone());
    lines.push(format!("  Total trips:            {}", stats.total_trips));
    lines.push(format!(
        "  Total distance (km):    {:.2}",
        stats.total_distance_km
    ));
    lines.push(format!(
        "  Average distance (km):  {:.2}",
        stats.avg_distance_km
    ));
    lines.push(format!(
        "  Average duration (min): {:.2}",
        stats.avg_duration_minutes
    ));

    lines.push(String::new());
    lines.push("3. STATION ACTIVITY".to_string());
    lines.push(rule.clone());
    lines.push("  Top start stations:".to_string());
    push_station_list(&mut lines, &stats.top_start_stations);
    lines.push("  Top end stations:".to_string());
    push_station_list(&mut lines, &stats.top_end_stations);

    lines.push(String::new());
    lines.push("4. TEMPORAL PATTERNS".to_string());
    lines.push(rule.clone());
    let peak = match stats.peak_hour {
        Some(hour) => format!("{:02}:00", hour),
        None => "n/a".to_string(),
    };
    lines.push(format!("  Peak hour:   {}", peak));
    lines.push(format!(
        "  Busiest day: {}",
        stats.busiest_day.as_deref().unwrap_or("n/a")
    ));
    lines.push("  Monthly trip volume:".to_string());
    if stats.monthly_trend.is_empty() {
        lines.push("    (no data)".to_string());
    }
    for (month, count) in &stats.monthly_trend {
        lines.push(format!("    {}: {}", month, count));
    }

    lines.push(String::new());
    lines.push("5. RIDERS".to_string());
    lines.push(rule.clone());
    lines.push("  Average distance by user type (km):".to_string());
    push_f64_map(&mut lines, &stats.avg_distance_by_user_type, "");
    lines.push("  Average trips per user by type:".to_string());
    push_f64_map(&mut lines, &stats.avg_trips_per_user_by_type, "");
    lines.push("  Top users:".to_string());
    if stats.top_users.is_empty() {
        lines.push("    (no data)".to_string());
    }
    for (rank, user) in stats.top_users.iter().enumerate() {
        lines.push(format!(
            "    {}. User {}: {} trips",
            rank + 1,
            user.user_id,
            user.trip_count
        ));
    }

    lines.push(String::new());
    lines.push("6. FLEET AND MAINTENANCE".to_string());
    lines.push(rule.clone());
    lines.push(format!(
        "  Fleet utilization rate: {:.2}%",
        stats.utilization_rate_pct
    ));
    lines.push(format!(
        "  Total maintenance cost: ${:.2}",
        stats.total_maintenance_cost
    ));
    lines.push("  Maintenance cost by bike type:".to_string());
    push_f64_map(&mut lines, &stats.maintenance_cost_by_bike_type, "$");

    lines.push(String::new());
    lines.push("7. TOP ROUTES".to_string());
    lines.push(rule.clone());
    if stats.top_routes.is_empty() {
        lines.push("  (no data)".to_string());
    }
    for (rank, route) in stats.top_routes.iter().enumerate() {
        lines.push(format!(
            "  {}. {} -> {}: {} trips",
            rank + 1,
            route.start_station_name,
            route.end_station_name,
            route.trip_count
        ));
    }

    lines.push(String::new());
    lines.push("8. TRIP DISTANCE DISTRIBUTION (km)".to_string());
    lines.push(rule);
    let dist = &stats.distance_distribution;
    lines.push(format!("  Mean:    {:.2}", dist.mean));
    lines.push(format!("  Median:  {:.2}", dist.median));
    lines.push(format!("  Std dev: {:.2}", dist.std_dev));
    lines.push(format!("  Min:     {:.2}", dist.min));
    lines.push(format!("  Max:     {:.2}", dist.max));

    lines.push(String::new());
    lines.join("\n")
}

fn push_station_list(lines: &mut Vec<String>, stations: &[crate::metrics::StationActivity]) {
    if stations.is_empty() {
        lines.push("    (no data)".to_string());
    }
    for (rank, station) in stations.iter().enumerate() {
        lines.push(format!(
            "    {}. {} (ID {}): {} trips",
            rank + 1,
            station.station_name,
            station.station_id,
            station.trip_count
        ));
    }
}

fn push_f64_map(
    lines: &mut Vec<String>,
    map: &std::collections::BTreeMap<String, f64>,
    unit_prefix: &str,
) {
    if map.is_empty() {
        lines.push("    (no data)".to_string());
    }
    for (key, value) in map {
        lines.push(format!("    {}: {}{:.2}", key, unit_prefix, value));
    }
}
