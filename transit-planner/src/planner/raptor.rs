//! Round-based earliest-arrival search.
//!
//! Round `k` finds every stop whose arrival improves by boarding exactly one
//! more vehicle than in round `k - 1`. Only routes calling at a stop that
//! improved in the previous round are scanned, each from the earliest
//! improved stop along it.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::{TransitTime, Trip};
use crate::network::{Network, RouteIdx, StopIdx};

use super::labels::{BackPointer, Labels, Marked};

/// Result of running the rounds.
#[derive(Debug, Clone)]
pub(crate) struct Search {
    pub labels: Labels,
    /// Round in which the target's best arrival was last improved.
    pub target_round: Option<usize>,
    /// Rounds actually executed, which may be fewer than requested.
    pub rounds_run: usize,
}

/// Runs up to `max_rounds` rounds from `origin`.
///
/// With a `target`, relaxations that cannot beat the best arrival found at
/// the target are skipped. An earliest arrival never needs to board at the
/// same stop twice, so no more rounds than there are stops are ever run,
/// whatever the budget.
pub(crate) fn run(
    network: &Network,
    origin: StopIdx,
    target: Option<StopIdx>,
    departure: TransitTime,
    max_rounds: usize,
) -> Search {
    let stop_count = network.stop_count();
    let mut labels = Labels::new(stop_count, origin, departure);
    let mut marked = Marked::new(stop_count);
    marked.insert(origin);

    let mut target_round = None;
    let mut rounds_run = 0;

    while rounds_run < max_rounds.min(stop_count) && !marked.is_empty() {
        let round = labels.start_round();
        rounds_run = round;

        let improved = marked.take();
        let queue = collect_routes(network, &improved);
        trace!(round, marked = improved.len(), routes = queue.len(), "Scanning routes");

        for (&route, &start) in &queue {
            scan_route(
                network,
                route,
                start,
                round,
                target,
                &mut labels,
                &mut marked,
                &mut target_round,
            );
        }
    }

    debug!(
        origin = %network.stop_at(origin).id(),
        rounds = rounds_run,
        arrival = ?target.and_then(|t| labels.best(t)),
        "Search finished"
    );

    Search {
        labels,
        target_round,
        rounds_run,
    }
}

/// Routes through the marked stops, each with the earliest position on it
/// at which a marked stop occurs. Ordered by route index.
fn collect_routes(network: &Network, marked: &[StopIdx]) -> BTreeMap<RouteIdx, usize> {
    let mut queue: BTreeMap<RouteIdx, usize> = BTreeMap::new();
    for &stop in marked {
        for call in network.routes_at(stop) {
            queue
                .entry(call.route)
                .and_modify(|pos| *pos = (*pos).min(call.position))
                .or_insert(call.position);
        }
    }
    queue
}

/// The trip currently ridden along a route scan.
#[derive(Debug, Clone, Copy)]
struct Boarded {
    trip: usize,
    board_pos: usize,
    board_stop: StopIdx,
}

#[allow(clippy::too_many_arguments)]
fn scan_route(
    network: &Network,
    route: RouteIdx,
    start: usize,
    round: usize,
    target: Option<StopIdx>,
    labels: &mut Labels,
    marked: &mut Marked,
    target_round: &mut Option<usize>,
) {
    let pattern = network.route_pattern(route);
    let trips = network.trips_on(route);
    let mut boarded: Option<Boarded> = None;

    for (pos, &stop) in pattern.iter().enumerate().skip(start) {
        if let Some(ride) = boarded {
            let arrival = trips[ride.trip].arrival_at(pos);
            if labels.improves(round, stop, target, arrival) {
                labels.set(
                    round,
                    stop,
                    arrival,
                    BackPointer {
                        route,
                        trip: ride.trip,
                        board_pos: ride.board_pos,
                        alight_pos: pos,
                        board_stop: ride.board_stop,
                    },
                );
                marked.insert(stop);
                if Some(stop) == target {
                    *target_round = Some(round);
                }
            }
        }

        let Some(ready) = labels.arrival(round - 1, stop) else {
            continue;
        };
        let Some(candidate) = earliest_trip(trips, pos, ready) else {
            continue;
        };
        let switch = match boarded {
            None => true,
            Some(ride) => trips[candidate].departure_at(pos) < trips[ride.trip].departure_at(pos),
        };
        if switch {
            boarded = Some(Boarded {
                trip: candidate,
                board_pos: pos,
                board_stop: stop,
            });
        }
    }
}

/// Index of the first trip departing position `pos` at or after `ready`.
///
/// Trips of a route never overtake, so departures at every position are
/// sorted in trip order.
pub(crate) fn earliest_trip(trips: &[Arc<Trip>], pos: usize, ready: TransitTime) -> Option<usize> {
    let idx = trips.partition_point(|trip| trip.departure_at(pos) < ready);
    (idx < trips.len()).then_some(idx)
}
