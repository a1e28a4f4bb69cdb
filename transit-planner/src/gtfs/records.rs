//! Rows of the GTFS files the loader reads.
//!
//! Only the columns the planner uses are declared; any others in the feed
//! are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::error::GtfsError;

/// A row of `stops.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRecord {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: Option<String>,
    #[serde(default)]
    pub stop_lat: Option<f64>,
    #[serde(default)]
    pub stop_lon: Option<f64>,
}

/// A row of `routes.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: Option<String>,
}

impl RouteRecord {
    /// Display name: short name, then long name, then the id.
    pub fn display_name(&self) -> &str {
        [&self.route_short_name, &self.route_long_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(self.route_id.trim())
    }
}

/// A row of `trips.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
}

/// A row of `stop_times.txt`.
///
/// Times may be blank at stops that are not timepoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StopTimeRecord {
    pub trip_id: String,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// A row of `calendar.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarRecord {
    pub service_id: String,

    /// Service availability by weekday (0 or 1)
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,

    #[serde(deserialize_with = "gtfs_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "gtfs_date")]
    pub end_date: NaiveDate,
}

/// A row of `calendar_dates.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarDateRecord {
    pub service_id: String,
    #[serde(deserialize_with = "gtfs_date")]
    pub date: NaiveDate,
    /// 1 adds service on `date`, 2 removes it
    pub exception_type: u8,
}

/// Parse a GTFS date (YYYYMMDD).
pub fn parse_date(s: &str) -> Result<NaiveDate, GtfsError> {
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d").map_err(|_| GtfsError::InvalidDate(s.to_string()))
}

fn gtfs_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d").map_err(serde::de::Error::custom)
}
