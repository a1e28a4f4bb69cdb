//! Route type.

use std::collections::HashSet;

use super::{NetworkError, RouteId, StopId};

/// A fixed calling pattern shared by one or more trips.
///
/// # Invariants
///
/// - At least one stop
/// - No stop appears twice
/// - The sequence never changes after construction; it is the only valid
///   boarding and alighting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    id: RouteId,
    name: String,
    stops: Vec<StopId>,
}

impl Route {
    /// Constructs a route, validating its stop sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::{Route, RouteId, StopId};
    ///
    /// let stops = ["A", "B", "C"].map(|s| StopId::parse(s).unwrap()).to_vec();
    /// let route = Route::new(RouteId::parse("R1").unwrap(), "Route 1", stops).unwrap();
    ///
    /// assert_eq!(route.index_of(&StopId::parse("B").unwrap()).unwrap(), 1);
    /// assert!(route.index_of(&StopId::parse("D").unwrap()).is_err());
    /// ```
    pub fn new(
        id: RouteId,
        name: impl Into<String>,
        stops: Vec<StopId>,
    ) -> Result<Self, NetworkError> {
        if stops.is_empty() {
            return Err(NetworkError::EmptyRoute(id));
        }

        let mut seen = HashSet::with_capacity(stops.len());
        for stop in &stops {
            if !seen.insert(stop) {
                return Err(NetworkError::RepeatedStopOnRoute {
                    route: id,
                    stop: stop.clone(),
                });
            }
        }

        Ok(Self {
            id,
            name: name.into(),
            stops,
        })
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops in calling order.
    pub fn stops(&self) -> &[StopId] {
        &self.stops
    }

    /// Number of stops on the route.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false: routes have at least one stop.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Position of `stop` in the calling order (0-based).
    pub fn index_of(&self, stop: &StopId) -> Result<usize, NetworkError> {
        self.stops
            .iter()
            .position(|s| s == stop)
            .ok_or_else(|| NetworkError::StopNotOnRoute {
                route: self.id.clone(),
                stop: stop.clone(),
            })
    }

    /// Returns true if the route calls at `stop`.
    pub fn serves(&self, stop: &StopId) -> bool {
        self.stops.contains(stop)
    }

    /// Stops called at after `stop`.
    ///
    /// Returns an empty slice if the route does not call at `stop`.
    pub fn stops_after(&self, stop: &StopId) -> &[StopId] {
        match self.index_of(stop) {
            Ok(idx) => &self.stops[idx + 1..],
            Err(_) => &[],
        }
    }
}
