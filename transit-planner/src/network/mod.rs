//! Transit network model.
//!
//! A `Network` owns every stop, route and trip of a timetable together with
//! the lookup indices the router needs. It is assembled once from loader
//! output and is read-only afterwards: queries borrow it and never mutate
//! it, so any number of queries may share one network across threads.
//!
//! Stops and routes get dense integer indices at assembly time. The router
//! works exclusively with these indices; identifiers are only used at the
//! edges.

mod search;
mod snapshot;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::domain::{NetworkError, Route, RouteId, Stop, StopId, Trip, TripId};

pub use search::StopMatch;
pub use snapshot::{SNAPSHOT_VERSION, SnapshotError};

/// Dense index of a stop in a `Network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopIdx(pub usize);

/// Dense index of a route in a `Network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteIdx(pub usize);

/// A route calling at a stop, and where on the route it calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCall {
    pub route: RouteIdx,
    pub position: usize,
}

/// Counts of the entities in a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStats {
    pub stops: usize,
    pub routes: usize,
    pub trips: usize,
}

/// An immutable, indexed transit network.
#[derive(Debug)]
pub struct Network {
    stops: Vec<Arc<Stop>>,
    stop_lookup: HashMap<StopId, StopIdx>,

    routes: Vec<Arc<Route>>,
    route_lookup: HashMap<RouteId, RouteIdx>,

    /// Each route's calling pattern as dense stop indices.
    route_stops: Vec<Vec<StopIdx>>,

    /// Each route's trips, sorted by departure from the first stop, then id.
    /// No trip overtakes an earlier one, so every position is sorted too.
    route_trips: Vec<Vec<Arc<Trip>>>,

    /// Stop -> routes calling there, ordered by route index.
    stop_routes: Vec<Vec<RouteCall>>,

    trip_lookup: HashMap<TripId, (RouteIdx, usize)>,
}

impl Network {
    /// Assembles a network and builds its indices.
    ///
    /// # Errors
    ///
    /// Returns `Err` if ids repeat, a route calls at an unknown stop, a trip
    /// runs on an unknown route, a trip does not fit its route, or one trip
    /// of a route overtakes another.
    pub fn new(
        stops: Vec<Stop>,
        routes: Vec<Route>,
        trips: Vec<Trip>,
    ) -> Result<Self, NetworkError> {
        let mut stop_lookup = HashMap::with_capacity(stops.len());
        for (idx, stop) in stops.iter().enumerate() {
            if stop_lookup.insert(stop.id().clone(), StopIdx(idx)).is_some() {
                return Err(NetworkError::DuplicateStop(stop.id().clone()));
            }
        }

        let mut route_lookup = HashMap::with_capacity(routes.len());
        let mut route_stops = Vec::with_capacity(routes.len());
        let mut stop_routes: Vec<Vec<RouteCall>> = vec![Vec::new(); stops.len()];

        for (idx, route) in routes.iter().enumerate() {
            if route_lookup.insert(route.id().clone(), RouteIdx(idx)).is_some() {
                return Err(NetworkError::DuplicateRoute(route.id().clone()));
            }

            let mut pattern = Vec::with_capacity(route.len());
            for (position, stop_id) in route.stops().iter().enumerate() {
                let stop = *stop_lookup
                    .get(stop_id)
                    .ok_or_else(|| NetworkError::UnknownStop {
                        route: route.id().clone(),
                        stop: stop_id.clone(),
                    })?;
                pattern.push(stop);
                stop_routes[stop.0].push(RouteCall {
                    route: RouteIdx(idx),
                    position,
                });
            }
            route_stops.push(pattern);
        }

        let mut route_trips: Vec<Vec<Arc<Trip>>> = vec![Vec::new(); routes.len()];
        let mut seen_trips = HashSet::with_capacity(trips.len());
        for trip in trips {
            if !seen_trips.insert(trip.id().clone()) {
                return Err(NetworkError::DuplicateTrip(trip.id().clone()));
            }
            let route_idx = *route_lookup
                .get(trip.route_id())
                .ok_or_else(|| NetworkError::UnknownRoute {
                    trip: trip.id().clone(),
                    route: trip.route_id().clone(),
                })?;
            trip.validate_against(&routes[route_idx.0])?;
            route_trips[route_idx.0].push(Arc::new(trip));
        }

        for (route, trips) in routes.iter().zip(&mut route_trips) {
            trips.sort_by(|a, b| {
                a.first_departure()
                    .cmp(&b.first_departure())
                    .then_with(|| a.id().cmp(b.id()))
            });
            check_no_overtaking(route, trips)?;
        }

        let mut trip_lookup = HashMap::new();
        for (route_idx, trips) in route_trips.iter().enumerate() {
            for (pos, trip) in trips.iter().enumerate() {
                trip_lookup.insert(trip.id().clone(), (RouteIdx(route_idx), pos));
            }
        }

        let network = Self {
            stops: stops.into_iter().map(Arc::new).collect(),
            stop_lookup,
            routes: routes.into_iter().map(Arc::new).collect(),
            route_lookup,
            route_stops,
            route_trips,
            stop_routes,
            trip_lookup,
        };

        debug!(
            stops = network.stops.len(),
            routes = network.routes.len(),
            trips = network.trip_lookup.len(),
            "Network assembled"
        );

        Ok(network)
    }

    // ----- identifier-level lookups -----

    /// Look up a stop by id.
    pub fn stop(&self, id: &StopId) -> Option<&Arc<Stop>> {
        self.stop_idx(id).map(|idx| &self.stops[idx.0])
    }

    /// Look up a route by id.
    pub fn route(&self, id: &RouteId) -> Option<&Arc<Route>> {
        self.route_idx(id).map(|idx| &self.routes[idx.0])
    }

    /// Look up a trip by id.
    pub fn trip(&self, id: &TripId) -> Option<&Arc<Trip>> {
        self.trip_lookup
            .get(id)
            .map(|(route, pos)| &self.route_trips[route.0][*pos])
    }

    /// Routes calling at `stop`, in network order.
    ///
    /// Returns an empty list for an unknown stop.
    pub fn routes_serving(&self, stop: &StopId) -> Vec<&Arc<Route>> {
        self.stop_idx(stop)
            .map(|idx| {
                self.routes_at(idx)
                    .iter()
                    .map(|call| &self.routes[call.route.0])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Trips of `route`, sorted by departure from its first stop with ties
    /// broken by trip id.
    ///
    /// Returns an empty slice for an unknown route.
    pub fn trips_of(&self, route: &RouteId) -> &[Arc<Trip>] {
        self.route_idx(route)
            .map(|idx| self.trips_on(idx))
            .unwrap_or(&[])
    }

    /// Position of `stop` in the calling order of `route`.
    ///
    /// # Errors
    ///
    /// `StopNotOnRoute` if the route does not call at the stop, or if the
    /// route itself is unknown.
    pub fn stop_index_on_route(
        &self,
        route: &RouteId,
        stop: &StopId,
    ) -> Result<usize, NetworkError> {
        match self.route(route) {
            Some(r) => r.index_of(stop),
            None => Err(NetworkError::StopNotOnRoute {
                route: route.clone(),
                stop: stop.clone(),
            }),
        }
    }

    // ----- dense-index lookups -----

    /// Dense index of a stop id.
    pub fn stop_idx(&self, id: &StopId) -> Option<StopIdx> {
        self.stop_lookup.get(id).copied()
    }

    /// Dense index of a route id.
    pub fn route_idx(&self, id: &RouteId) -> Option<RouteIdx> {
        self.route_lookup.get(id).copied()
    }

    /// # Panics
    ///
    /// Panics if `idx` did not come from this network.
    pub fn stop_at(&self, idx: StopIdx) -> &Arc<Stop> {
        &self.stops[idx.0]
    }

    /// # Panics
    ///
    /// Panics if `idx` did not come from this network.
    pub fn route_at(&self, idx: RouteIdx) -> &Arc<Route> {
        &self.routes[idx.0]
    }

    /// Routes calling at a stop, with the stop's position on each.
    pub fn routes_at(&self, stop: StopIdx) -> &[RouteCall] {
        self.stop_routes.get(stop.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Calling pattern of a route as dense stop indices.
    pub fn route_pattern(&self, route: RouteIdx) -> &[StopIdx] {
        self.route_stops
            .get(route.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sorted trips of a route.
    pub fn trips_on(&self, route: RouteIdx) -> &[Arc<Trip>] {
        self.route_trips
            .get(route.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ----- whole-network views -----

    /// All stops in index order.
    pub fn stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }

    /// All routes in index order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// All trips, grouped by route in index order.
    pub fn trips(&self) -> impl Iterator<Item = &Arc<Trip>> {
        self.route_trips.iter().flatten()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trip_lookup.len()
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            stops: self.stop_count(),
            routes: self.route_count(),
            trips: self.trip_count(),
        }
    }
}

/// Checks that arrivals and departures at every position follow the sorted
/// trip order.
fn check_no_overtaking(route: &Route, trips: &[Arc<Trip>]) -> Result<(), NetworkError> {
    for pair in trips.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        let ahead = earlier
            .stop_times()
            .iter()
            .zip(later.stop_times())
            .any(|(a, b)| b.departure < a.departure || b.arrival < a.arrival);
        if ahead {
            return Err(NetworkError::OvertakingTrips {
                route: route.id().clone(),
                earlier: earlier.id().clone(),
                later: later.id().clone(),
            });
        }
    }
    Ok(())
}
