//! Query facade: validation, defaults, search and reconstruction.

use crate::domain::{Journey, StopId, TransitTime};
use crate::network::{Network, StopIdx};

use super::config::QueryConfig;
use super::raptor;
use super::reconstruct::reconstruct;

/// Error from a journey query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Origin or destination is not a stop of the network
    #[error("unknown stop: {0}")]
    UnknownStop(StopId),

    /// A query needs at least one round
    #[error("max_rounds must be at least 1")]
    InvalidMaxRounds,

    /// The search labels do not chain back to the origin
    #[error("journey reconstruction failed: {reason}")]
    BrokenChain { reason: String },
}

/// Result of a successful query.
///
/// Not finding a journey is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Earliest-arrival journey to the destination
    Found(Journey),
    /// Origin and destination are the same stop
    AlreadyThere,
    /// No journey within the round budget
    Unreachable,
}

impl QueryOutcome {
    /// The journey, if one was found.
    pub fn journey(&self) -> Option<&Journey> {
        match self {
            Self::Found(journey) => Some(journey),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Finds the earliest-arrival journey from `origin` to `destination`
/// leaving no earlier than `departure`, boarding at most `max_rounds`
/// vehicles.
///
/// Among journeys arriving at the same time, the one with fewest transfers
/// wins. Identical inputs always give identical results.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::{Route, RouteId, Stop, StopId, StopTime, TransitTime, Trip, TripId};
/// use transit_planner::network::Network;
/// use transit_planner::planner::{query, QueryOutcome};
///
/// let id = |s: &str| StopId::parse(s).unwrap();
/// let t = |s: &str| TransitTime::parse_hms(s).unwrap();
///
/// let route = Route::new(RouteId::parse("R1").unwrap(), "Coastal", vec![id("A"), id("B")]).unwrap();
/// let trip = Trip::from_ordered(
///     TripId::parse("T1").unwrap(),
///     &route,
///     vec![StopTime::at(t("08:00:00")), StopTime::at(t("08:30:00"))],
/// )
/// .unwrap();
/// let stops = vec![Stop::new(id("A"), "Alpha"), Stop::new(id("B"), "Beta")];
/// let network = Network::new(stops, vec![route], vec![trip]).unwrap();
///
/// let outcome = query(&network, &id("A"), &id("B"), t("07:45:00"), 5).unwrap();
/// assert_eq!(outcome.journey().unwrap().arrival_time(), t("08:30:00"));
///
/// let outcome = query(&network, &id("B"), &id("A"), t("07:45:00"), 5).unwrap();
/// assert_eq!(outcome, QueryOutcome::Unreachable);
/// ```
pub fn query(
    network: &Network,
    origin: &StopId,
    destination: &StopId,
    departure: TransitTime,
    max_rounds: usize,
) -> Result<QueryOutcome, QueryError> {
    let origin_idx = resolve(network, origin)?;
    let destination_idx = resolve(network, destination)?;
    if max_rounds == 0 {
        return Err(QueryError::InvalidMaxRounds);
    }
    if origin_idx == destination_idx {
        return Ok(QueryOutcome::AlreadyThere);
    }

    let search = raptor::run(
        network,
        origin_idx,
        Some(destination_idx),
        departure,
        max_rounds,
    );

    let Some(round) = search.target_round else {
        return Ok(QueryOutcome::Unreachable);
    };

    let journey = reconstruct(
        network,
        &search.labels,
        origin_idx,
        destination_idx,
        round,
        departure,
    )?;
    Ok(QueryOutcome::Found(journey))
}

fn resolve(network: &Network, stop: &StopId) -> Result<StopIdx, QueryError> {
    network
        .stop_idx(stop)
        .ok_or_else(|| QueryError::UnknownStop(stop.clone()))
}

/// Journey planner over a shared network.
///
/// Holds no per-query state; any number of planners may borrow the same
/// network at once.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    network: &'a Network,
    config: QueryConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(network: &'a Network, config: QueryConfig) -> Self {
        Self { network, config }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Plan with the configured round budget.
    pub fn plan(
        &self,
        origin: &StopId,
        destination: &StopId,
        departure: TransitTime,
    ) -> Result<QueryOutcome, QueryError> {
        self.plan_with_rounds(origin, destination, departure, self.config.max_rounds)
    }

    /// Plan with an explicit round budget.
    pub fn plan_with_rounds(
        &self,
        origin: &StopId,
        destination: &StopId,
        departure: TransitTime,
        max_rounds: usize,
    ) -> Result<QueryOutcome, QueryError> {
        query(self.network, origin, destination, departure, max_rounds)
    }

    /// Earliest arrival at every stop reachable from `origin` within the
    /// configured round budget, in network stop order. The origin itself is
    /// included at `departure`.
    pub fn earliest_arrivals(
        &self,
        origin: &StopId,
        departure: TransitTime,
    ) -> Result<Vec<(StopId, TransitTime)>, QueryError> {
        let origin_idx = resolve(self.network, origin)?;
        if self.config.max_rounds == 0 {
            return Err(QueryError::InvalidMaxRounds);
        }

        let search = raptor::run(
            self.network,
            origin_idx,
            None,
            departure,
            self.config.max_rounds,
        );
        Ok(search
            .labels
            .reached()
            .map(|(stop, time)| (self.network.stop_at(stop).id().clone(), time))
            .collect())
    }
}
