//! Turning GTFS rows into a network.
//!
//! A GTFS route is a marketing line whose trips may call at different
//! stops. The network needs every route to have one fixed calling pattern
//! with trips that never overtake each other, so each GTFS route is split
//! into one network route per (pattern, non-overtaking chain), numbered
//! `"{route_id}:{n}"`.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use super::error::GtfsError;
use super::records::{RouteRecord, StopRecord, StopTimeRecord, TripRecord};
use crate::domain::{Route, RouteId, Stop, StopId, StopTime, TransitTime, Trip, TripId};
use crate::network::Network;

/// Rows read from a feed.
#[derive(Debug, Clone, Default)]
pub struct FeedTables {
    pub stops: Vec<StopRecord>,
    pub routes: Vec<RouteRecord>,
    pub trips: Vec<TripRecord>,
    pub stop_times: Vec<StopTimeRecord>,
}

/// What a load kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub stops: usize,
    pub routes: usize,
    pub trips: usize,
    /// Trips dropped for being unusable (too short, looping, unknown stops)
    pub skipped_trips: usize,
    /// Trips not running on the service date
    pub inactive_trips: usize,
}

/// Trips sharing one calling pattern of one GTFS route.
#[derive(Debug)]
struct Pattern {
    stops: Vec<StopId>,
    trips: Vec<(TripId, Vec<StopTime>)>,
}

/// Builds a network from feed rows, keeping only trips whose service id is
/// in `active` when given.
pub fn assemble(
    tables: &FeedTables,
    active: Option<&HashSet<String>>,
) -> Result<(Network, LoadSummary), GtfsError> {
    let mut summary = LoadSummary::default();

    let known_stops: HashSet<&str> = tables.stops.iter().map(|s| s.stop_id.trim()).collect();
    let stops = tables
        .stops
        .iter()
        .map(to_stop)
        .collect::<Result<Vec<_>, _>>()?;

    let route_names: HashMap<&str, &str> = tables
        .routes
        .iter()
        .map(|r| (r.route_id.trim(), r.display_name()))
        .collect();

    let mut by_trip: HashMap<&str, Vec<&StopTimeRecord>> = HashMap::new();
    for call in &tables.stop_times {
        by_trip.entry(call.trip_id.trim()).or_default().push(call);
    }

    let mut patterns: BTreeMap<&str, Vec<Pattern>> = BTreeMap::new();

    for trip in &tables.trips {
        let trip_id = trip.trip_id.trim();
        let route_id = trip.route_id.trim();

        if active.is_some_and(|active| !active.contains(trip.service_id.trim())) {
            summary.inactive_trips += 1;
            continue;
        }
        if !route_names.contains_key(route_id) {
            warn!(trip = trip_id, route = route_id, "Trip on unknown route, skipping");
            summary.skipped_trips += 1;
            continue;
        }
        let Some(mut calls) = by_trip.remove(trip_id) else {
            debug!(trip = trip_id, "Trip has no stop times, skipping");
            summary.skipped_trips += 1;
            continue;
        };
        calls.sort_by_key(|c| c.stop_sequence);

        if let Some(call) = calls.iter().find(|c| !known_stops.contains(c.stop_id.trim())) {
            warn!(trip = trip_id, stop = call.stop_id.trim(), "Trip calls at unknown stop, skipping");
            summary.skipped_trips += 1;
            continue;
        }

        let mut pattern = Vec::with_capacity(calls.len());
        let mut times = Vec::with_capacity(calls.len());
        for call in &calls {
            if let Some(time) = stop_time(trip_id, call)? {
                pattern.push(StopId::parse(&call.stop_id)?);
                times.push(time);
            }
        }

        if pattern.len() < 2 {
            debug!(trip = trip_id, calls = pattern.len(), "Trip too short, skipping");
            summary.skipped_trips += 1;
            continue;
        }
        if pattern.iter().collect::<HashSet<_>>().len() != pattern.len() {
            warn!(trip = trip_id, route = route_id, "Trip visits a stop twice, skipping");
            summary.skipped_trips += 1;
            continue;
        }

        let trip_id = TripId::parse(trip_id)?;
        let groups = patterns.entry(route_id).or_default();
        match groups.iter_mut().find(|g| g.stops == pattern) {
            Some(group) => group.trips.push((trip_id, times)),
            None => groups.push(Pattern {
                stops: pattern,
                trips: vec![(trip_id, times)],
            }),
        }
    }

    let mut routes = Vec::new();
    let mut trips = Vec::new();
    for (route_id, groups) in patterns {
        let name = route_names.get(route_id).copied().unwrap_or(route_id);
        let mut n = 0;
        for group in groups {
            for chain in fifo_chains(group.trips) {
                let route = Route::new(
                    RouteId::parse(&format!("{route_id}:{n}"))?,
                    name,
                    group.stops.clone(),
                )?;
                n += 1;
                for (id, times) in chain {
                    trips.push(Trip::from_ordered(id, &route, times)?);
                }
                routes.push(route);
            }
        }
    }

    summary.stops = stops.len();
    summary.routes = routes.len();
    summary.trips = trips.len();

    let network = Network::new(stops, routes, trips)?;
    Ok((network, summary))
}

fn to_stop(record: &StopRecord) -> Result<Stop, GtfsError> {
    let id = StopId::parse(&record.stop_id)?;
    let name = record
        .stop_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(id.as_str())
        .to_string();
    let stop = Stop::new(id, name);
    Ok(match (record.stop_lat, record.stop_lon) {
        (Some(lat), Some(lon)) => stop.with_coordinates(lat, lon),
        _ => stop,
    })
}

/// Times of one call, or `None` for a stop that isn't a timepoint.
///
/// A call with only one of its two times uses it for both.
fn stop_time(trip: &str, call: &StopTimeRecord) -> Result<Option<StopTime>, GtfsError> {
    let parse = |value: &str| {
        TransitTime::parse_hms(value).map_err(|source| GtfsError::InvalidTime {
            trip: trip.to_string(),
            value: value.to_string(),
            source,
        })
    };
    let arrival = call.arrival_time.as_deref().filter(|s| !s.is_empty());
    let departure = call.departure_time.as_deref().filter(|s| !s.is_empty());

    match (arrival.or(departure), departure.or(arrival)) {
        (Some(a), Some(d)) => Ok(Some(StopTime::new(parse(a)?, parse(d)?))),
        _ => Ok(None),
    }
}

/// Splits trips into chains in which no trip overtakes the one before it.
///
/// Trips are taken in order of first departure (then id) and each joins the
/// first chain it doesn't overtake.
fn fifo_chains(mut trips: Vec<(TripId, Vec<StopTime>)>) -> Vec<Vec<(TripId, Vec<StopTime>)>> {
    trips.sort_by(|(a_id, a), (b_id, b)| {
        a[0].departure
            .cmp(&b[0].departure)
            .then_with(|| a_id.cmp(b_id))
    });

    let mut chains: Vec<Vec<(TripId, Vec<StopTime>)>> = Vec::new();
    for trip in trips {
        let fits = chains.iter_mut().find(|chain| {
            chain
                .last()
                .is_some_and(|(_, before)| !overtakes(before, &trip.1))
        });
        match fits {
            Some(chain) => chain.push(trip),
            None => chains.push(vec![trip]),
        }
    }
    chains
}

/// Returns true if `later` is ahead of `earlier` anywhere along the pattern.
fn overtakes(earlier: &[StopTime], later: &[StopTime]) -> bool {
    earlier
        .iter()
        .zip(later)
        .any(|(a, b)| b.departure < a.departure || b.arrival < a.arrival)
}
