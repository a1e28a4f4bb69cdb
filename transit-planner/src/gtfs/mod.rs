//! GTFS feed loading.
//!
//! Reads a static GTFS feed (unpacked directory or zip archive) and builds
//! a [`Network`] for one service day. Malformed input is rejected here, so
//! the router only ever sees a network that satisfies its invariants.

mod assemble;
mod calendar;
mod download;
mod error;
mod feed;
mod records;

use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::network::Network;

pub use assemble::{FeedTables, LoadSummary, assemble};
pub use calendar::active_services;
pub use download::{download_feed, extract_feed};
pub use error::GtfsError;
pub use feed::Feed;
pub use records::{
    CalendarDateRecord, CalendarRecord, RouteRecord, StopRecord, StopTimeRecord, TripRecord,
    parse_date,
};

/// Reads the tables the network is built from.
pub fn read_tables(feed: &Feed) -> Result<FeedTables, GtfsError> {
    Ok(FeedTables {
        stops: feed.read("stops.txt")?,
        routes: feed.read("routes.txt")?,
        trips: feed.read("trips.txt")?,
        stop_times: feed.read("stop_times.txt")?,
    })
}

/// Loads the feed at `path` into a network.
///
/// With a `service_date`, only trips running that day are kept. A feed
/// without `calendar.txt` or `calendar_dates.txt` keeps every trip.
pub fn load(
    path: &Path,
    service_date: Option<NaiveDate>,
) -> Result<(Network, LoadSummary), GtfsError> {
    let feed = Feed::open(path)?;
    let tables = read_tables(&feed)?;
    info!(
        path = %path.display(),
        stops = tables.stops.len(),
        trips = tables.trips.len(),
        stop_times = tables.stop_times.len(),
        "Read GTFS feed"
    );

    let active = match service_date {
        Some(date) => {
            let calendar: Option<Vec<CalendarRecord>> = feed.read_optional("calendar.txt")?;
            let exceptions: Option<Vec<CalendarDateRecord>> =
                feed.read_optional("calendar_dates.txt")?;
            if calendar.is_none() && exceptions.is_none() {
                warn!(%date, "Feed has no calendar, keeping every trip");
                None
            } else {
                let active = active_services(
                    calendar.as_deref().unwrap_or_default(),
                    exceptions.as_deref().unwrap_or_default(),
                    date,
                );
                info!(%date, services = active.len(), "Filtering to active services");
                Some(active)
            }
        }
        None => None,
    };

    let (network, summary) = assemble(&tables, active.as_ref())?;
    info!(
        stops = summary.stops,
        routes = summary.routes,
        trips = summary.trips,
        skipped = summary.skipped_trips,
        inactive = summary.inactive_trips,
        "Built network from GTFS"
    );
    Ok((network, summary))
}
