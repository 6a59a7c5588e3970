//! Typed entity containers for the bike-share domain.
//!
//! The pipeline itself works on DataFrames; these types exist at the boundary
//! for callers that want typed records, and they carry the closed bike/user
//! variant sets:
//!
//! - [`Bike`] is exactly one of classic (mechanical gears) or electric
//!   (battery plus assist range);
//! - [`User`] is exactly one of casual (day passes) or member (subscription
//!   with a tier).
//!
//! Construction goes through the `from_fields` factories, which dispatch on
//! the raw type string the way the source data encodes it.

use crate::error::Result;
use crate::metrics::descriptive::euclidean_distance;
use crate::utils::{f64_values, id_keys, string_values};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fmt;
use tracing::warn;

// =============================================================================
// Bikes
// =============================================================================

/// The closed set of bike types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BikeKind {
    Classic,
    Electric,
}

impl BikeKind {
    /// Parse a raw `bike_type` value. Anything that is not "electric" is a
    /// classic bike, mirroring how the fleet data encodes the split.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("electric") {
            BikeKind::Electric
        } else {
            BikeKind::Classic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BikeKind::Classic => "classic",
            BikeKind::Electric => "electric",
        }
    }
}

/// A bike is exactly one variant; the variant fields never overlap.
#[derive(Debug, Clone, PartialEq)]
pub enum Bike {
    Classic {
        bike_id: String,
        gear_count: u32,
    },
    Electric {
        bike_id: String,
        battery_level: f64,
        max_range_km: f64,
    },
}

impl Bike {
    /// Factory dispatching on the raw `bike_type` value. Variant fields that
    /// are absent in the row default to zero.
    pub fn from_fields(
        bike_id: impl Into<String>,
        bike_type: &str,
        gear_count: Option<u32>,
        battery_level: Option<f64>,
        max_range_km: Option<f64>,
    ) -> Self {
        match BikeKind::parse(bike_type) {
            BikeKind::Electric => Bike::Electric {
                bike_id: bike_id.into(),
                battery_level: battery_level.unwrap_or(0.0),
                max_range_km: max_range_km.unwrap_or(0.0),
            },
            BikeKind::Classic => Bike::Classic {
                bike_id: bike_id.into(),
                gear_count: gear_count.unwrap_or(0),
            },
        }
    }

    pub fn bike_id(&self) -> &str {
        match self {
            Bike::Classic { bike_id, .. } | Bike::Electric { bike_id, .. } => bike_id,
        }
    }

    pub fn kind(&self) -> BikeKind {
        match self {
            Bike::Classic { .. } => BikeKind::Classic,
            Bike::Electric { .. } => BikeKind::Electric,
        }
    }
}

impl fmt::Display for Bike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bike {} ({})", self.bike_id(), self.kind().as_str())
    }
}

// =============================================================================
// Users
// =============================================================================

/// The closed set of user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKind {
    Casual,
    Member,
}

impl UserKind {
    /// Parse a raw `user_type` value. Anything that is not "casual" is a
    /// member.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("casual") {
            UserKind::Casual
        } else {
            UserKind::Member
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserKind::Casual => "casual",
            UserKind::Member => "member",
        }
    }
}

/// Membership tiers for subscribed users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipTier {
    Basic,
    Premium,
}

impl MembershipTier {
    /// Parse a raw tier value, defaulting to basic on anything unrecognized.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("premium") {
            MembershipTier::Premium
        } else {
            MembershipTier::Basic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Basic => "basic",
            MembershipTier::Premium => "premium",
        }
    }
}

/// A user is exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum User {
    Casual {
        user_id: String,
        name: String,
        email: String,
        day_pass_count: u32,
    },
    Member {
        user_id: String,
        name: String,
        email: String,
        tier: MembershipTier,
        membership_start: Option<NaiveDate>,
        membership_end: Option<NaiveDate>,
    },
}

impl User {
    /// Factory dispatching on the raw `user_type` value.
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        user_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        user_type: &str,
        day_pass_count: Option<u32>,
        membership_start: Option<NaiveDate>,
        membership_end: Option<NaiveDate>,
        tier: Option<&str>,
    ) -> Self {
        match UserKind::parse(user_type) {
            UserKind::Casual => User::Casual {
                user_id: user_id.into(),
                name: name.into(),
                email: email.into(),
                day_pass_count: day_pass_count.unwrap_or(0),
            },
            UserKind::Member => User::Member {
                user_id: user_id.into(),
                name: name.into(),
                email: email.into(),
                tier: tier.map(MembershipTier::parse).unwrap_or(MembershipTier::Basic),
                membership_start,
                membership_end,
            },
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            User::Casual { user_id, .. } | User::Member { user_id, .. } => user_id,
        }
    }

    pub fn kind(&self) -> UserKind {
        match self {
            User::Casual { .. } => UserKind::Casual,
            User::Member { .. } => UserKind::Member,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            User::Casual {
                name,
                day_pass_count,
                ..
            } => write!(f, "User: {} (casual) (Passes: {})", name, day_pass_count),
            User::Member { name, tier, .. } => {
                write!(f, "User: {} (member) [Tier: {}]", name, tier.as_str())
            }
        }
    }
}

// =============================================================================
// Stations, trips, maintenance
// =============================================================================

/// A physical dock location.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub capacity: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    /// Planar distance between two stations' coordinates.
    pub fn distance_to(&self, other: &Station) -> f64 {
        euclidean_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Station '{}' (ID: {}) - Cap: {}",
            self.name, self.station_id, self.capacity
        )
    }
}

/// One rental, as a flat row.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub trip_id: String,
    pub bike_id: String,
    pub user_id: String,
    pub start_station_id: String,
    pub end_station_id: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub distance_km: f64,
    pub duration_minutes: Option<f64>,
    pub user_type: String,
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trip {}: Bike {} from station {} to station {}",
            self.trip_id, self.bike_id, self.start_station_id, self.end_station_id
        )
    }
}

/// One maintenance log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceRecord {
    pub record_id: String,
    pub bike_id: String,
    pub date: Option<NaiveDate>,
    pub maintenance_type: String,
    pub cost: f64,
    pub description: String,
}

impl fmt::Display for MaintenanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        write!(
            f,
            "Maintenance [{}] | Bike {} | {} | Cost: ${:.2}",
            date, self.bike_id, self.maintenance_type, self.cost
        )
    }
}

// =============================================================================
// Extraction from cleaned tables
// =============================================================================

/// Extract typed station records from a cleaned stations table.
///
/// Schema-tolerant: the display name comes from `station_name` or `name`,
/// whichever exists, and is synthesized as `"Station {id}"` when neither
/// does; capacity and coordinates default to zero when absent. A table with
/// no `station_id` column yields no records.
pub fn extract_stations(df: &DataFrame) -> Result<Vec<Station>> {
    let Ok(id_col) = df.column("station_id") else {
        warn!("stations table has no station_id column; no stations extracted");
        return Ok(Vec::new());
    };
    let ids = id_keys(id_col.as_materialized_series())?;

    let names = ["station_name", "name"]
        .iter()
        .find_map(|c| df.column(c).ok())
        .map(|col| string_values(col.as_materialized_series()))
        .transpose()?;
    let capacities = df
        .column("capacity")
        .ok()
        .map(|col| f64_values(col.as_materialized_series()))
        .transpose()?;
    let latitudes = df
        .column("latitude")
        .ok()
        .map(|col| f64_values(col.as_materialized_series()))
        .transpose()?;
    let longitudes = df
        .column("longitude")
        .ok()
        .map(|col| f64_values(col.as_materialized_series()))
        .transpose()?;

    let value_at = |view: &Option<Vec<Option<f64>>>, i: usize| -> f64 {
        view.as_ref()
            .and_then(|v| v.get(i).copied().flatten())
            .unwrap_or(0.0)
    };

    let mut stations = Vec::with_capacity(df.height());
    for (i, id) in ids.into_iter().enumerate() {
        let Some(id) = id else { continue };

        let name = names
            .as_ref()
            .and_then(|v| v.get(i).cloned().flatten())
            .unwrap_or_else(|| format!("Station {}", id));

        stations.push(Station {
            name,
            capacity: value_at(&capacities, i) as i64,
            latitude: value_at(&latitudes, i),
            longitude: value_at(&longitudes, i),
            station_id: id,
        });
    }

    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== factory tests ====================

    #[test]
    fn test_bike_factory_electric() {
        let bike = Bike::from_fields("B12", "electric", None, Some(87.0), Some(60.0));
        assert_eq!(
            bike,
            Bike::Electric {
                bike_id: "B12".to_string(),
                battery_level: 87.0,
                max_range_km: 60.0,
            }
        );
        assert_eq!(bike.kind(), BikeKind::Electric);
    }

    #[test]
    fn test_bike_factory_anything_else_is_classic() {
        let bike = Bike::from_fields("7", "cargo", None, None, None);
        assert_eq!(
            bike,
            Bike::Classic {
                bike_id: "7".to_string(),
                gear_count: 0,
            }
        );
    }

    #[test]
    fn test_bike_display() {
        let bike = Bike::from_fields("3", "classic", Some(21), None, None);
        assert_eq!(bike.to_string(), "Bike 3 (classic)");
    }

    #[test]
    fn test_user_factory_casual() {
        let user = User::from_fields(
            "U1",
            "Olena",
            "olena@example.com",
            "casual",
            Some(4),
            None,
            None,
            None,
        );
        assert_eq!(user.kind(), UserKind::Casual);
        assert_eq!(user.to_string(), "User: Olena (casual) (Passes: 4)");
    }

    #[test]
    fn test_user_factory_member_with_tier() {
        let since = NaiveDate::from_ymd_opt(2023, 5, 1);
        let user = User::from_fields(
            "U2",
            "Marko",
            "marko@example.com",
            "member",
            None,
            since,
            None,
            Some("premium"),
        );
        match &user {
            User::Member {
                tier,
                membership_start,
                ..
            } => {
                assert_eq!(*tier, MembershipTier::Premium);
                assert_eq!(*membership_start, since);
            }
            other => panic!("expected member, got {:?}", other),
        }
        assert_eq!(user.to_string(), "User: Marko (member) [Tier: premium]");
    }

    #[test]
    fn test_tier_parse_defaults_to_basic() {
        assert_eq!(MembershipTier::parse("gold"), MembershipTier::Basic);
        assert_eq!(MembershipTier::parse("PREMIUM"), MembershipTier::Premium);
    }

    // ==================== display tests ====================

    #[test]
    fn test_station_display() {
        let station = Station {
            station_id: "5".to_string(),
            name: "Central".to_string(),
            capacity: 20,
            latitude: 50.45,
            longitude: 30.52,
        };
        assert_eq!(station.to_string(), "Station 'Central' (ID: 5) - Cap: 20");
    }

    #[test]
    fn test_maintenance_display_two_decimal_cost() {
        let record = MaintenanceRecord {
            record_id: "M1".to_string(),
            bike_id: "9".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15),
            maintenance_type: "brake repair".to_string(),
            cost: 12.5,
            description: "front brake pads".to_string(),
        };
        assert_eq!(
            record.to_string(),
            "Maintenance [2024-03-15] | Bike 9 | brake repair | Cost: $12.50"
        );
    }

    #[test]
    fn test_station_distance_to() {
        let a = Station {
            station_id: "1".to_string(),
            name: "A".to_string(),
            capacity: 10,
            latitude: 0.0,
            longitude: 0.0,
        };
        let b = Station {
            station_id: "2".to_string(),
            name: "B".to_string(),
            capacity: 10,
            latitude: 3.0,
            longitude: 4.0,
        };
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }

    // ==================== extract_stations tests ====================

    #[test]
    fn test_extract_stations_basic() {
        let df = df!(
            "station_id" => &[1i64, 2],
            "station_name" => &["Central", "Harbor"],
            "capacity" => &[20i64, 15],
            "latitude" => &[50.45, 50.46],
            "longitude" => &[30.52, 30.61],
        )
        .unwrap();

        let stations = extract_stations(&df).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].station_id, "1");
        assert_eq!(stations[0].name, "Central");
        assert_eq!(stations[1].capacity, 15);
    }

    #[test]
    fn test_extract_stations_accepts_name_column() {
        let df = df!(
            "station_id" => &[7i64],
            "name" => &["Depot"],
        )
        .unwrap();

        let stations = extract_stations(&df).unwrap();
        assert_eq!(stations[0].name, "Depot");
        assert_eq!(stations[0].capacity, 0);
    }

    #[test]
    fn test_extract_stations_synthesizes_missing_names() {
        let df = df!(
            "station_id" => &[3i64],
            "capacity" => &[12i64],
        )
        .unwrap();

        let stations = extract_stations(&df).unwrap();
        assert_eq!(stations[0].name, "Station 3");
    }

    #[test]
    fn test_extract_stations_without_id_column_is_empty() {
        let df = df!("name" => &["Orphan"]).unwrap();
        assert!(extract_stations(&df).unwrap().is_empty());
    }

    #[test]
    fn test_extract_stations_skips_null_ids() {
        let df = df!(
            "station_id" => &[Some(1i64), None],
            "station_name" => &["Central", "Ghost"],
        )
        .unwrap();

        let stations = extract_stations(&df).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Central");
    }
}
