//! Journey reconstruction from back-pointers.

use crate::domain::{Journey, Leg, RouteStop, TransitTime};
use crate::network::{Network, StopIdx};

use super::labels::Labels;
use super::query::QueryError;

/// Walks back from `target`'s label in `round` to the origin, turning each
/// back-pointer into a leg.
///
/// Each step moves to the boarding stop one round earlier, so the walk ends
/// within `round` steps. Reaching round 0 anywhere but the origin, or a
/// missing back-pointer, means the labels are inconsistent.
pub(crate) fn reconstruct(
    network: &Network,
    labels: &Labels,
    origin: StopIdx,
    target: StopIdx,
    round: usize,
    requested_departure: TransitTime,
) -> Result<Journey, QueryError> {
    let mut legs = Vec::with_capacity(round);
    let mut stop = target;
    let mut round = round;

    while stop != origin {
        if round == 0 {
            return Err(broken(format!(
                "chain ended at {} instead of the origin",
                network.stop_at(stop).id()
            )));
        }

        let via = labels.back_pointer(round, stop).ok_or_else(|| {
            broken(format!(
                "no back-pointer for {} in round {round}",
                network.stop_at(stop).id()
            ))
        })?;

        let trip = network
            .trips_on(via.route)
            .get(via.trip)
            .cloned()
            .ok_or_else(|| broken(format!("trip {} missing from route {}", via.trip, via.route.0)))?;

        let leg = Leg::new(
            network.route_at(via.route).clone(),
            trip,
            RouteStop::new(via.board_pos, network.stop_at(via.board_stop).clone()),
            RouteStop::new(via.alight_pos, network.stop_at(stop).clone()),
        )
        .map_err(|e| broken(e.to_string()))?;

        legs.push(leg);
        stop = via.board_stop;
        round -= 1;
    }

    legs.reverse();
    Journey::new(requested_departure, legs).map_err(|e| broken(e.to_string()))
}

fn broken(reason: String) -> QueryError {
    QueryError::BrokenChain { reason }
}
