//! Trip type.
//!
//! A `Trip` is one scheduled run of a `Route`. Its times are stored in the
//! route's calling order, so position `i` of the trip is position `i` of the
//! route.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{NetworkError, Route, RouteId, StopId, TransitTime, TripId};

/// Arrival and departure at one stop of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTime {
    pub arrival: TransitTime,
    pub departure: TransitTime,
}

impl StopTime {
    pub fn new(arrival: TransitTime, departure: TransitTime) -> Self {
        Self { arrival, departure }
    }

    /// A call with no dwell time.
    pub fn at(time: TransitTime) -> Self {
        Self::new(time, time)
    }
}

/// One scheduled run of a route.
///
/// # Invariants
///
/// - Exactly one stop time per stop of the route
/// - `arrival <= departure` at every stop
/// - `departure` at stop `i` is no later than `arrival` at stop `i + 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    id: TripId,
    route: RouteId,
    times: Vec<StopTime>,
}

impl Trip {
    /// Constructs a trip from a stop → time mapping.
    ///
    /// The mapping's stops must be exactly the route's stops; order does not
    /// matter, the route supplies it.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::{Route, RouteId, StopId, StopTime, TransitTime, Trip, TripId};
    ///
    /// let a = StopId::parse("A").unwrap();
    /// let b = StopId::parse("B").unwrap();
    /// let route = Route::new(RouteId::parse("R1").unwrap(), "R1", vec![a.clone(), b.clone()]).unwrap();
    ///
    /// let t = |s: &str| TransitTime::parse_hms(s).unwrap();
    /// let trip = Trip::new(
    ///     TripId::parse("T1").unwrap(),
    ///     &route,
    ///     [(b, StopTime::at(t("08:10:00"))), (a, StopTime::at(t("08:00:00")))],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(trip.departure_at(0), t("08:00:00"));
    /// assert_eq!(trip.arrival_at(1), t("08:10:00"));
    /// ```
    pub fn new(
        id: TripId,
        route: &Route,
        stop_times: impl IntoIterator<Item = (StopId, StopTime)>,
    ) -> Result<Self, NetworkError> {
        let mut by_stop: HashMap<StopId, StopTime> = HashMap::with_capacity(route.len());
        for (stop, time) in stop_times {
            if by_stop.insert(stop, time).is_some() {
                return Err(mismatch(&id, route));
            }
        }
        if by_stop.len() != route.len() {
            return Err(mismatch(&id, route));
        }

        let times = route
            .stops()
            .iter()
            .map(|stop| by_stop.get(stop).copied())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| mismatch(&id, route))?;

        Self::from_ordered(id, route, times)
    }

    /// Constructs a trip from times already in the route's calling order.
    pub fn from_ordered(
        id: TripId,
        route: &Route,
        times: Vec<StopTime>,
    ) -> Result<Self, NetworkError> {
        let trip = Self {
            id,
            route: route.id().clone(),
            times,
        };
        trip.validate_against(route)?;
        Ok(trip)
    }

    /// Checks the trip's invariants against `route`.
    ///
    /// Run at construction, and again when a network is assembled in case
    /// a trip is paired with a different route of the same id.
    pub fn validate_against(&self, route: &Route) -> Result<(), NetworkError> {
        if self.route != *route.id() || self.times.len() != route.len() {
            return Err(mismatch(&self.id, route));
        }

        for (stop, time) in route.stops().iter().zip(&self.times) {
            if time.arrival > time.departure {
                return Err(NetworkError::DwellReversed {
                    trip: self.id.clone(),
                    stop: stop.clone(),
                });
            }
        }

        for (i, pair) in self.times.windows(2).enumerate() {
            if pair[0].departure > pair[1].arrival {
                return Err(NetworkError::NonMonotonicSchedule {
                    trip: self.id.clone(),
                    from: route.stops()[i].clone(),
                    to: route.stops()[i + 1].clone(),
                });
            }
        }

        Ok(())
    }

    pub fn id(&self) -> &TripId {
        &self.id
    }

    /// The route this trip runs on.
    pub fn route_id(&self) -> &RouteId {
        &self.route
    }

    /// Times in the route's calling order.
    pub fn stop_times(&self) -> &[StopTime] {
        &self.times
    }

    /// Time at route position `pos`, if in range.
    pub fn stop_time(&self, pos: usize) -> Option<StopTime> {
        self.times.get(pos).copied()
    }

    /// Arrival at route position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not a position on the trip's route.
    pub fn arrival_at(&self, pos: usize) -> TransitTime {
        self.times[pos].arrival
    }

    /// Departure from route position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not a position on the trip's route.
    pub fn departure_at(&self, pos: usize) -> TransitTime {
        self.times[pos].departure
    }

    /// Departure from the route's first stop.
    pub fn first_departure(&self) -> TransitTime {
        // Safe: routes are non-empty and validated to match
        self.times[0].departure
    }
}

fn mismatch(trip: &TripId, route: &Route) -> NetworkError {
    NetworkError::StopTimesMismatch {
        trip: trip.clone(),
        route: route.id().clone(),
    }
}
