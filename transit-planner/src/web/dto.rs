//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Journey, Leg, Stop, TransitTime};
use crate::network::StopMatch;
use crate::planner::QueryOutcome;

/// Query string for stop search.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Free text: a stop id or part of a name
    pub q: String,

    /// Maximum number of results
    pub limit: Option<usize>,
}

/// A stop in search results.
#[derive(Debug, Serialize)]
pub struct StopSearchResult {
    pub id: String,
    pub name: String,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopSearchResult>,
}

/// Query string for journey planning.
///
/// Everything is taken as text so malformed values get a JSON error body
/// rather than the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct PlanJourneyRequest {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// Earliest departure, `HH:MM:SS`
    pub time: String,

    /// Vehicle boarding budget (defaults to the server's setting)
    pub max_rounds: Option<String>,
}

/// Response for journey planning.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanJourneyResponse {
    Found { journey: JourneyResult },
    AlreadyThere,
    Unreachable,
}

/// A journey.
#[derive(Debug, Serialize)]
pub struct JourneyResult {
    /// Where the journey starts
    pub origin: StopInfo,

    /// Where the journey ends
    pub destination: StopInfo,

    /// Time the traveller asked to leave
    pub requested_departure: String,

    /// Departure time of the first leg
    pub departure_time: String,

    /// Arrival time at destination
    pub arrival_time: String,

    /// Minutes from requested departure to arrival
    pub duration_mins: i64,

    /// Minutes spent waiting between legs
    pub wait_mins: i64,

    /// Number of transfers
    pub transfers: usize,

    /// Legs in travel order
    pub legs: Vec<LegResult>,
}

/// One ride in a journey.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub route_id: String,
    pub route_name: String,
    pub trip_id: String,

    /// Boarding stop, with departure time
    pub board: StopInfo,

    /// Alighting stop, with arrival time
    pub alight: StopInfo,

    /// Stops passed without getting off
    pub intermediate_stops: usize,
}

/// Stop information for display.
#[derive(Debug, Serialize)]
pub struct StopInfo {
    pub id: String,
    pub name: String,

    /// Time at this stop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl From<StopMatch> for StopSearchResult {
    fn from(m: StopMatch) -> Self {
        Self {
            id: m.id.as_str().to_string(),
            name: m.name,
        }
    }
}

impl PlanJourneyResponse {
    /// Create from a query outcome.
    pub fn from_outcome(outcome: &QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Found(journey) => Self::Found {
                journey: JourneyResult::from_journey(journey),
            },
            QueryOutcome::AlreadyThere => Self::AlreadyThere,
            QueryOutcome::Unreachable => Self::Unreachable,
        }
    }
}

impl JourneyResult {
    /// Create from a domain Journey.
    pub fn from_journey(journey: &Journey) -> Self {
        Self {
            origin: StopInfo::new(journey.origin(), None),
            destination: StopInfo::new(journey.destination(), None),
            requested_departure: journey.requested_departure().to_string(),
            departure_time: journey.departure_time().to_string(),
            arrival_time: journey.arrival_time().to_string(),
            duration_mins: journey.total_duration().num_minutes(),
            wait_mins: journey.total_wait().num_minutes(),
            transfers: journey.transfer_count(),
            legs: journey.legs().iter().map(LegResult::from_leg).collect(),
        }
    }
}

impl LegResult {
    /// Create from a domain Leg.
    pub fn from_leg(leg: &Leg) -> Self {
        Self {
            route_id: leg.route().id().as_str().to_string(),
            route_name: leg.route().name().to_string(),
            trip_id: leg.trip().id().as_str().to_string(),
            board: StopInfo::new(leg.board_stop(), Some(leg.departure_time())),
            alight: StopInfo::new(leg.alight_stop(), Some(leg.arrival_time())),
            intermediate_stops: leg.intermediate_stop_count(),
        }
    }
}

impl StopInfo {
    fn new(stop: &Stop, time: Option<TransitTime>) -> Self {
        Self {
            id: stop.id().as_str().to_string(),
            name: stop.name().to_string(),
            time: time.map(|t| t.to_string()),
        }
    }
}
