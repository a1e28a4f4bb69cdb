//! Scenario and property tests for journey queries.

use std::collections::HashMap;
use std::sync::Arc;

use super::*;
use crate::domain::{Journey, NetworkError, StopId, StopTime, TransitTime, Trip, TripId};
use crate::network::Network;
use crate::network::tests::{fixture, make_route, make_stops, make_trip, route_id, stop_id, t};

fn found(outcome: QueryOutcome) -> Journey {
    match outcome {
        QueryOutcome::Found(journey) => journey,
        other => panic!("expected a journey, got {other:?}"),
    }
}

/// Legs as "board-alight route".
fn leg_summary(journey: &Journey) -> Vec<String> {
    journey
        .legs()
        .iter()
        .map(|leg| {
            format!(
                "{}-{} {}",
                leg.board_stop().id(),
                leg.alight_stop().id(),
                leg.route().id()
            )
        })
        .collect()
}

// ============================================================================
// Fixture scenarios
// ============================================================================

#[test]
fn direct_journey() {
    let net = fixture();
    let journey = found(query(&net, &stop_id("A"), &stop_id("C"), t("08:00:00"), 5).unwrap());

    assert_eq!(journey.leg_count(), 1);
    assert_eq!(journey.transfer_count(), 0);
    assert_eq!(journey.arrival_time(), t("08:20:00"));
    assert_eq!(leg_summary(&journey), vec!["A-C R1"]);
}

#[test]
fn journey_with_one_transfer() {
    let net = fixture();
    let journey = found(query(&net, &stop_id("A"), &stop_id("D"), t("08:00:00"), 2).unwrap());

    assert_eq!(journey.transfer_count(), 1);
    assert_eq!(leg_summary(&journey), vec!["A-B R1", "B-D R2"]);

    let legs = journey.legs();
    assert_eq!(legs[0].arrival_time(), t("08:10:00"));
    assert_eq!(legs[1].departure_time(), t("08:15:00"));
    assert_eq!(legs[1].arrival_time(), t("08:25:00"));
}

#[test]
fn transfer_beyond_round_budget_is_unreachable() {
    let net = fixture();
    let outcome = query(&net, &stop_id("A"), &stop_id("D"), t("08:00:00"), 1).unwrap();
    assert_eq!(outcome, QueryOutcome::Unreachable);
}

#[test]
fn origin_equals_destination() {
    let net = fixture();
    let outcome = query(&net, &stop_id("A"), &stop_id("A"), t("08:00:00"), 5).unwrap();
    assert_eq!(outcome, QueryOutcome::AlreadyThere);
    assert!(outcome.journey().is_none());
}

#[test]
fn unknown_destination() {
    let net = fixture();
    let unknown = stop_id("unknown-stop");
    let err = query(&net, &stop_id("A"), &unknown, t("08:00:00"), 5).unwrap_err();
    assert_eq!(err, QueryError::UnknownStop(unknown));
}

#[test]
fn routes_are_one_way() {
    let net = fixture();
    let outcome = query(&net, &stop_id("C"), &stop_id("A"), t("08:00:00"), 5).unwrap();
    assert_eq!(outcome, QueryOutcome::Unreachable);
}

// ============================================================================
// Facade behaviour
// ============================================================================

#[test]
fn unknown_origin() {
    let net = fixture();
    let err = query(&net, &stop_id("Z"), &stop_id("A"), t("08:00:00"), 5).unwrap_err();
    assert_eq!(err, QueryError::UnknownStop(stop_id("Z")));
}

#[test]
fn zero_rounds_rejected() {
    let net = fixture();
    let err = query(&net, &stop_id("A"), &stop_id("C"), t("08:00:00"), 0).unwrap_err();
    assert_eq!(err, QueryError::InvalidMaxRounds);
}

#[test]
fn planner_uses_default_rounds() {
    let net = fixture();
    let planner = Planner::new(&net, QueryConfig::default());
    assert_eq!(planner.config().max_rounds, DEFAULT_MAX_ROUNDS);

    let journey = found(planner.plan(&stop_id("A"), &stop_id("D"), t("08:00:00")).unwrap());
    assert_eq!(journey.arrival_time(), t("08:25:00"));
}

#[test]
fn planner_respects_configured_rounds() {
    let net = fixture();
    let planner = Planner::new(&net, QueryConfig::new(1));
    let outcome = planner.plan(&stop_id("A"), &stop_id("D"), t("08:00:00")).unwrap();
    assert_eq!(outcome, QueryOutcome::Unreachable);

    let outcome = planner
        .plan_with_rounds(&stop_id("A"), &stop_id("D"), t("08:00:00"), 2)
        .unwrap();
    assert!(outcome.is_found());
}

#[test]
fn departing_after_last_trip_is_unreachable() {
    let net = fixture();
    let outcome = query(&net, &stop_id("A"), &stop_id("C"), t("08:00:01"), 5).unwrap();
    assert_eq!(outcome, QueryOutcome::Unreachable);
}

#[test]
fn earliest_arrivals_lists_reached_stops() {
    let net = fixture();
    let planner = Planner::new(&net, QueryConfig::default());
    let arrivals = planner.earliest_arrivals(&stop_id("A"), t("08:00:00")).unwrap();

    assert_eq!(
        arrivals,
        vec![
            (stop_id("A"), t("08:00:00")),
            (stop_id("B"), t("08:10:00")),
            (stop_id("C"), t("08:20:00")),
            (stop_id("D"), t("08:25:00")),
        ]
    );
    assert!(matches!(
        planner.earliest_arrivals(&stop_id("Z"), t("08:00:00")),
        Err(QueryError::UnknownStop(_))
    ));
}

// ============================================================================
// Timetable shapes
// ============================================================================

#[test]
fn waits_for_next_trip() {
    let r = make_route("R1", &["A", "B"]);
    let first = make_trip("T1", &r, &["08:00:00", "08:20:00"]);
    let second = make_trip("T2", &r, &["08:30:00", "08:50:00"]);
    let net = Network::new(make_stops(&["A", "B"]), vec![r], vec![first, second]).unwrap();

    let journey = found(query(&net, &stop_id("A"), &stop_id("B"), t("08:05:00"), 5).unwrap());
    assert_eq!(journey.legs()[0].trip().id().as_str(), "T2");
    assert_eq!(journey.total_duration(), chrono::Duration::minutes(45));
}

#[test]
fn boards_trip_departing_exactly_at_ready_time() {
    let net = fixture();
    // The only R2 trip leaves B at 08:15.
    let journey = found(query(&net, &stop_id("B"), &stop_id("D"), t("08:15:00"), 1).unwrap());
    assert_eq!(journey.departure_time(), t("08:15:00"));
}

#[test]
fn transfer_beats_slower_direct_route() {
    let direct = make_route("R1", &["A", "C"]);
    let feeder = make_route("R2", &["A", "B"]);
    let onward = make_route("R3", &["B", "C"]);
    let trips = vec![
        make_trip("T1", &direct, &["08:00:00", "09:00:00"]),
        make_trip("T2", &feeder, &["08:00:00", "08:10:00"]),
        make_trip("T3", &onward, &["08:15:00", "08:30:00"]),
    ];
    let net = Network::new(
        make_stops(&["A", "B", "C"]),
        vec![direct, feeder, onward],
        trips,
    )
    .unwrap();

    let fast = found(query(&net, &stop_id("A"), &stop_id("C"), t("08:00:00"), 5).unwrap());
    assert_eq!(fast.arrival_time(), t("08:30:00"));
    assert_eq!(fast.transfer_count(), 1);

    let direct_only = found(query(&net, &stop_id("A"), &stop_id("C"), t("08:00:00"), 1).unwrap());
    assert_eq!(direct_only.arrival_time(), t("09:00:00"));
    assert!(direct_only.is_direct());
}

#[test]
fn equal_arrival_prefers_fewer_transfers() {
    let r1 = make_route("R1", &["A", "B", "C"]);
    let r2 = make_route("R2", &["B", "C"]);
    let t1 = make_trip("T1", &r1, &["08:00:00", "08:10:00", "08:20:00"]);
    let t2 = make_trip("T2", &r2, &["08:12:00", "08:20:00"]);
    let net = Network::new(make_stops(&["A", "B", "C"]), vec![r1, r2], vec![t1, t2]).unwrap();

    let journey = found(query(&net, &stop_id("A"), &stop_id("C"), t("08:00:00"), 5).unwrap());
    assert!(journey.is_direct());
}

#[test]
fn trips_past_midnight() {
    let r = make_route("R1", &["A", "B"]);
    let late = make_trip("T1", &r, &["23:50:00", "24:20:00"]);
    let net = Network::new(make_stops(&["A", "B"]), vec![r], vec![late]).unwrap();

    let journey = found(query(&net, &stop_id("A"), &stop_id("B"), t("23:45:00"), 5).unwrap());
    assert_eq!(journey.arrival_time().to_string(), "24:20:00");
}

#[test]
fn overtaking_timetable_is_not_a_network() {
    let r = make_route("R1", &["A", "B", "C"]);
    let slow = make_trip("T1", &r, &["08:00:00", "08:40:00", "09:00:00"]);
    let fast = make_trip("T2", &r, &["08:05:00", "08:15:00", "08:25:00"]);

    let result = Network::new(make_stops(&["A", "B", "C"]), vec![r], vec![slow, fast]);
    assert!(matches!(result, Err(NetworkError::OvertakingTrips { .. })));
}

#[test]
fn faster_trip_on_its_own_route_is_taken() {
    // The overtaking run split onto its own route, as the feed loader does.
    let slow_route = make_route("R1", &["A", "B", "C"]);
    let fast_route = make_route("R1X", &["A", "B", "C"]);
    let slow = make_trip("T1", &slow_route, &["08:00:00", "08:40:00", "09:00:00"]);
    let fast = make_trip("T2", &fast_route, &["08:05:00", "08:15:00", "08:25:00"]);
    let net = Network::new(
        make_stops(&["A", "B", "C"]),
        vec![slow_route, fast_route],
        vec![slow, fast],
    )
    .unwrap();

    let journey = found(query(&net, &stop_id("A"), &stop_id("C"), t("07:50:00"), 5).unwrap());
    assert_eq!(journey.legs()[0].trip().id().as_str(), "T2");
    assert_eq!(journey.arrival_time(), t("08:25:00"));
}

#[test]
fn unbounded_round_budget() {
    let net = fixture();

    let journey = found(query(&net, &stop_id("A"), &stop_id("D"), t("08:00:00"), usize::MAX).unwrap());
    assert_eq!(journey.arrival_time(), t("08:25:00"));

    let planner = Planner::new(&net, QueryConfig::new(usize::MAX));
    let arrivals = planner.earliest_arrivals(&stop_id("A"), t("08:00:00")).unwrap();
    assert!(arrivals.contains(&(stop_id("D"), t("08:25:00"))));
}

#[test]
fn dwell_time_respected_when_boarding() {
    let r = make_route("R1", &["A", "B", "C"]);
    let trip = Trip::from_ordered(
        TripId::parse("T1").unwrap(),
        &r,
        vec![
            StopTime::at(t("08:00:00")),
            StopTime::new(t("08:10:00"), t("08:14:00")),
            StopTime::at(t("08:20:00")),
        ],
    )
    .unwrap();
    let net = Network::new(make_stops(&["A", "B", "C"]), vec![r], vec![trip]).unwrap();

    // Can still board at B during the dwell, but not after it ends.
    assert!(query(&net, &stop_id("B"), &stop_id("C"), t("08:12:00"), 1).unwrap().is_found());
    assert_eq!(
        query(&net, &stop_id("B"), &stop_id("C"), t("08:14:01"), 1).unwrap(),
        QueryOutcome::Unreachable
    );
}

#[test]
fn queries_share_network_across_threads() {
    let net = Arc::new(fixture());
    let expected = query(&net, &stop_id("A"), &stop_id("D"), t("08:00:00"), 5).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let net = Arc::clone(&net);
            std::thread::spawn(move || {
                query(&net, &stop_id("A"), &stop_id("D"), t("08:00:00"), 5).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// ============================================================================
// Property tests
// ============================================================================

mod proptests {
    use super::*;
    use crate::gtfs::{FeedTables, RouteRecord, StopRecord, StopTimeRecord, TripRecord, assemble};
    use proptest::prelude::*;

    /// A GTFS route over stops `S{i}`. Each trip has its own hop times, so
    /// later trips regularly overtake earlier ones.
    #[derive(Debug, Clone)]
    struct RawRoute {
        stops: Vec<usize>,
        trips: Vec<RawTrip>,
    }

    #[derive(Debug, Clone)]
    struct RawTrip {
        start_mins: u32,
        hop_mins: Vec<u32>,
    }

    fn raw_route(stop_count: usize) -> impl Strategy<Value = RawRoute> {
        prop::sample::subsequence((0..stop_count).collect::<Vec<_>>(), 2..=stop_count.min(5))
            .prop_shuffle()
            .prop_flat_map(|stops| {
                let trip = (0u32..180, prop::collection::vec(1u32..20, stops.len() - 1))
                    .prop_map(|(start_mins, hop_mins)| RawTrip {
                        start_mins,
                        hop_mins,
                    });
                (Just(stops), prop::collection::vec(trip, 1..5))
            })
            .prop_map(|(stops, trips)| RawRoute { stops, trips })
    }

    fn raw_network() -> impl Strategy<Value = (usize, Vec<RawRoute>)> {
        (3usize..8).prop_flat_map(|n| (Just(n), prop::collection::vec(raw_route(n), 1..6)))
    }

    fn name(i: usize) -> String {
        format!("S{i}")
    }

    /// Loads the raw routes the way a feed is loaded, so overtaking trips
    /// end up on separate network routes.
    fn build((stop_count, raw): &(usize, Vec<RawRoute>)) -> Network {
        let mut tables = FeedTables {
            stops: (0..*stop_count)
                .map(|i| StopRecord {
                    stop_id: name(i),
                    stop_name: Some(format!("Stop {i}")),
                    stop_lat: None,
                    stop_lon: None,
                })
                .collect(),
            ..FeedTables::default()
        };

        for (r, shape) in raw.iter().enumerate() {
            let route = format!("R{r}");
            tables.routes.push(RouteRecord {
                route_id: route.clone(),
                route_short_name: None,
                route_long_name: None,
            });

            for (i, trip) in shape.trips.iter().enumerate() {
                let trip_id = format!("{route}T{i}");
                tables.trips.push(TripRecord {
                    route_id: route.clone(),
                    service_id: "daily".to_string(),
                    trip_id: trip_id.clone(),
                });

                let mut time = 6 * 3600 + trip.start_mins * 60;
                for (seq, &stop) in shape.stops.iter().enumerate() {
                    if seq > 0 {
                        time += trip.hop_mins[seq - 1] * 60;
                    }
                    let at = TransitTime::from_seconds(time).to_string();
                    tables.stop_times.push(StopTimeRecord {
                        trip_id: trip_id.clone(),
                        arrival_time: Some(at.clone()),
                        departure_time: Some(at),
                        stop_id: name(stop),
                        stop_sequence: seq as u32 + 1,
                    });
                }
            }
        }

        let (net, summary) = assemble(&tables, None).unwrap();
        let raw_trips: usize = raw.iter().map(|shape| shape.trips.len()).sum();
        assert_eq!(summary.trips, raw_trips);
        net
    }

    /// Earliest arrival using at most `rounds` vehicles, by relaxing every
    /// trip once per round.
    fn reference_arrival(
        net: &Network,
        origin: &StopId,
        destination: &StopId,
        departure: TransitTime,
        rounds: usize,
    ) -> Option<TransitTime> {
        let mut best: HashMap<StopId, TransitTime> = HashMap::from([(origin.clone(), departure)]);
        for _ in 0..rounds {
            let previous = best.clone();
            for trip in net.trips() {
                let route = net.route(trip.route_id()).unwrap();
                let mut boarded = false;
                for (pos, stop) in route.stops().iter().enumerate() {
                    if boarded {
                        let arrival = trip.arrival_at(pos);
                        best.entry(stop.clone())
                            .and_modify(|t| *t = (*t).min(arrival))
                            .or_insert(arrival);
                    } else if previous
                        .get(stop)
                        .is_some_and(|&ready| trip.departure_at(pos) >= ready)
                    {
                        boarded = true;
                    }
                }
            }
        }
        best.get(destination).copied()
    }

    fn departure(mins: u32) -> TransitTime {
        TransitTime::from_seconds(6 * 3600 + mins * 60)
    }

    fn arrival_of(outcome: &QueryOutcome) -> Option<TransitTime> {
        outcome.journey().map(Journey::arrival_time)
    }

    proptest! {
        #[test]
        fn matches_reference_earliest_arrival(
            raw in raw_network(),
            o in 0usize..8,
            d in 0usize..8,
            mins in 0u32..200,
            rounds in 1usize..5,
        ) {
            let net = build(&raw);
            let (origin, destination) = (stop_id(&name(o % raw.0)), stop_id(&name(d % raw.0)));
            prop_assume!(origin != destination);

            let outcome = query(&net, &origin, &destination, departure(mins), rounds).unwrap();
            let expected = reference_arrival(&net, &origin, &destination, departure(mins), rounds);
            prop_assert_eq!(arrival_of(&outcome), expected);
        }

        #[test]
        fn repeated_queries_are_identical(
            raw in raw_network(),
            o in 0usize..8,
            d in 0usize..8,
            mins in 0u32..200,
        ) {
            let net = build(&raw);
            let (origin, destination) = (stop_id(&name(o % raw.0)), stop_id(&name(d % raw.0)));

            let first = query(&net, &origin, &destination, departure(mins), 5);
            let second = query(&net, &origin, &destination, departure(mins), 5);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn more_rounds_never_arrive_later(
            raw in raw_network(),
            o in 0usize..8,
            d in 0usize..8,
            mins in 0u32..200,
        ) {
            let net = build(&raw);
            let (origin, destination) = (stop_id(&name(o % raw.0)), stop_id(&name(d % raw.0)));
            prop_assume!(origin != destination);

            let mut previous: Option<TransitTime> = None;
            for rounds in 1..=5 {
                let outcome = query(&net, &origin, &destination, departure(mins), rounds).unwrap();
                let arrival = arrival_of(&outcome);
                if let Some(before) = previous {
                    prop_assert!(arrival.is_some_and(|now| now <= before));
                }
                previous = arrival.or(previous);
            }
        }

        #[test]
        fn journeys_move_forward_in_time(
            raw in raw_network(),
            o in 0usize..8,
            d in 0usize..8,
            mins in 0u32..200,
            rounds in 1usize..6,
        ) {
            let net = build(&raw);
            let (origin, destination) = (stop_id(&name(o % raw.0)), stop_id(&name(d % raw.0)));
            let outcome = query(&net, &origin, &destination, departure(mins), rounds).unwrap();

            if let Some(journey) = outcome.journey() {
                prop_assert!(journey.leg_count() <= rounds);
                prop_assert_eq!(journey.origin().id(), &origin);
                prop_assert_eq!(journey.destination().id(), &destination);
                prop_assert!(journey.departure_time() >= departure(mins));
                for leg in journey.legs() {
                    prop_assert!(leg.departure_time() <= leg.arrival_time());
                }
                for pair in journey.legs().windows(2) {
                    prop_assert!(pair[0].arrival_time() <= pair[1].departure_time());
                }
            }
        }

        #[test]
        fn interleaved_queries_do_not_interfere(
            raw in raw_network(),
            a in 0usize..8,
            b in 0usize..8,
            c in 0usize..8,
            mins in 0u32..200,
        ) {
            let net = build(&raw);
            let n = raw.0;
            let (sa, sb, sc) = (stop_id(&name(a % n)), stop_id(&name(b % n)), stop_id(&name(c % n)));

            let alone = query(&net, &sa, &sb, departure(mins), 5);
            let _other = query(&net, &sc, &sa, departure(mins + 7), 3);
            let again = query(&net, &sa, &sb, departure(mins), 5);
            prop_assert_eq!(alone, again);
        }
    }
}
