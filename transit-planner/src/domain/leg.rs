//! Journey leg type.
//!
//! A `Leg` is one ride on one trip, from boarding to alighting. It holds
//! `Arc`s into the network so legs are cheap to clone and outlive the query
//! that produced them.

use std::sync::Arc;

use super::{DomainError, Route, Stop, TransitTime, Trip};

/// A stop together with its position on a route.
#[derive(Debug, Clone)]
pub struct RouteStop {
    pub position: usize,
    pub stop: Arc<Stop>,
}

impl RouteStop {
    pub fn new(position: usize, stop: Arc<Stop>) -> Self {
        Self { position, stop }
    }
}

/// A leg of a journey (one trip).
///
/// Times are read from the trip at construction, so `departure_time()` and
/// `arrival_time()` never fail.
///
/// # Invariants
///
/// - The trip runs on the route
/// - Boarding and alighting stops sit at their positions on the route
/// - `alight.position > board.position` (must travel forward)
#[derive(Debug, Clone)]
pub struct Leg {
    route: Arc<Route>,
    trip: Arc<Trip>,
    board: RouteStop,
    alight: RouteStop,
    departure: TransitTime,
    arrival: TransitTime,
}

impl Leg {
    /// Construct a leg, validating positions against the route.
    pub fn new(
        route: Arc<Route>,
        trip: Arc<Trip>,
        board: RouteStop,
        alight: RouteStop,
    ) -> Result<Self, DomainError> {
        if trip.route_id() != route.id() {
            return Err(DomainError::InvalidLeg("trip does not run on route"));
        }
        if alight.position <= board.position {
            return Err(DomainError::InvalidLeg(
                "alight position must be after board position",
            ));
        }
        if route.stops().get(board.position) != Some(board.stop.id()) {
            return Err(DomainError::InvalidLeg(
                "boarding stop is not at boarding position",
            ));
        }
        if route.stops().get(alight.position) != Some(alight.stop.id()) {
            return Err(DomainError::InvalidLeg(
                "alighting stop is not at alighting position",
            ));
        }

        let departure = trip
            .stop_time(board.position)
            .ok_or(DomainError::InvalidLeg("trip has no time at boarding stop"))?
            .departure;
        let arrival = trip
            .stop_time(alight.position)
            .ok_or(DomainError::InvalidLeg("trip has no time at alighting stop"))?
            .arrival;

        Ok(Self {
            route,
            trip,
            board,
            alight,
            departure,
            arrival,
        })
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn trip(&self) -> &Arc<Trip> {
        &self.trip
    }

    pub fn board_stop(&self) -> &Arc<Stop> {
        &self.board.stop
    }

    pub fn alight_stop(&self) -> &Arc<Stop> {
        &self.alight.stop
    }

    pub fn board_position(&self) -> usize {
        self.board.position
    }

    pub fn alight_position(&self) -> usize {
        self.alight.position
    }

    /// Departure from the boarding stop.
    pub fn departure_time(&self) -> TransitTime {
        self.departure
    }

    /// Arrival at the alighting stop.
    pub fn arrival_time(&self) -> TransitTime {
        self.arrival
    }

    /// Time spent on board.
    pub fn duration(&self) -> chrono::Duration {
        self.arrival.signed_duration_since(self.departure)
    }

    /// Number of stops passed between boarding and alighting.
    pub fn intermediate_stop_count(&self) -> usize {
        self.alight.position - self.board.position - 1
    }
}

impl PartialEq for Leg {
    fn eq(&self, other: &Self) -> bool {
        self.trip.id() == other.trip.id()
            && self.board.position == other.board.position
            && self.alight.position == other.alight.position
    }
}

impl Eq for Leg {}
