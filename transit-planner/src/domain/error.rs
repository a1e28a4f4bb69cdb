//! Domain error types.
//!
//! `NetworkError` covers malformed loader output and is raised while the
//! network is being assembled. `DomainError` covers legs and journeys that
//! do not hang together.

use super::{RouteId, StopId, TripId};

/// Errors raised while validating stops, routes and trips.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Two stops share an id
    #[error("duplicate stop {0}")]
    DuplicateStop(StopId),

    /// Two routes share an id
    #[error("duplicate route {0}")]
    DuplicateRoute(RouteId),

    /// Two trips share an id
    #[error("duplicate trip {0}")]
    DuplicateTrip(TripId),

    /// A route must call somewhere
    #[error("route {0} has no stops")]
    EmptyRoute(RouteId),

    /// A route's calling pattern repeats a stop
    #[error("route {route} calls at stop {stop} more than once")]
    RepeatedStopOnRoute { route: RouteId, stop: StopId },

    /// A route calls at a stop the network does not know
    #[error("route {route} references unknown stop {stop}")]
    UnknownStop { route: RouteId, stop: StopId },

    /// A trip runs on a route the network does not know
    #[error("trip {trip} references unknown route {route}")]
    UnknownRoute { trip: TripId, route: RouteId },

    /// A trip's timed stops differ from its route's stops
    #[error("stop times of trip {trip} do not cover exactly the stops of route {route}")]
    StopTimesMismatch { trip: TripId, route: RouteId },

    /// A trip leaves a stop before it arrives there
    #[error("trip {trip} departs {stop} before arriving there")]
    DwellReversed { trip: TripId, stop: StopId },

    /// A trip reaches the next stop before leaving the previous one
    #[error("trip {trip} travels backward in time between {from} and {to}")]
    NonMonotonicSchedule {
        trip: TripId,
        from: StopId,
        to: StopId,
    },

    /// A later trip on a route gets ahead of an earlier one somewhere
    #[error("trip {later} overtakes trip {earlier} on route {route}")]
    OvertakingTrips {
        route: RouteId,
        earlier: TripId,
        later: TripId,
    },

    /// Index lookup of a stop on a route that does not call there
    #[error("stop {stop} is not on route {route}")]
    StopNotOnRoute { route: RouteId, stop: StopId },
}

/// Errors from assembling legs and journeys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Invalid leg construction (e.g., alight before board)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Consecutive legs don't share a stop
    #[error("legs do not connect: alighted at {0} but next leg boards at {1}")]
    LegsNotConnected(StopId, StopId),

    /// Next leg departs before the previous one arrives
    #[error("connection at {0} departs before the previous leg arrives")]
    MissedConnection(StopId),

    /// First leg leaves before the requested departure time
    #[error("journey departs before the requested time")]
    DepartsBeforeRequest,

    /// Journey has no legs
    #[error("journey must have at least one leg")]
    EmptyJourney,
}
