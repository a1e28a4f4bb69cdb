//! Per-query working state of the round-based search.
//!
//! Everything here is owned by a single query and indexed by dense stop
//! index, so no state is ever shared between queries.

use crate::domain::TransitTime;
use crate::network::{RouteIdx, StopIdx};

/// How a stop's label in some round was reached: by riding trip `trip` of
/// `route` from `board_pos` to `alight_pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BackPointer {
    pub route: RouteIdx,
    /// Index into the route's sorted trip list.
    pub trip: usize,
    pub board_pos: usize,
    pub alight_pos: usize,
    pub board_stop: StopIdx,
}

/// Arrival labels for each round started so far, plus the best arrival at
/// each stop over all of them.
///
/// Rows are added one round at a time, so memory follows the rounds actually
/// run rather than the budget asked for. `None` stands for "not reached".
#[derive(Debug, Clone)]
pub(crate) struct Labels {
    stop_count: usize,
    rounds: usize,
    arrivals: Vec<Option<TransitTime>>,
    back: Vec<Option<BackPointer>>,
    best: Vec<Option<TransitTime>>,
}

impl Labels {
    /// Fresh labels with only the origin reached, at `departure`, in round 0.
    pub fn new(stop_count: usize, origin: StopIdx, departure: TransitTime) -> Self {
        let mut labels = Self {
            stop_count,
            rounds: 1,
            arrivals: vec![None; stop_count],
            back: vec![None; stop_count],
            best: vec![None; stop_count],
        };
        labels.arrivals[origin.0] = Some(departure);
        labels.best[origin.0] = Some(departure);
        labels
    }

    /// Adds an empty row for the next round and returns its number.
    pub fn start_round(&mut self) -> usize {
        let len = self.arrivals.len() + self.stop_count;
        self.arrivals.resize(len, None);
        self.back.resize(len, None);
        self.rounds += 1;
        self.rounds - 1
    }

    fn slot(&self, round: usize, stop: StopIdx) -> usize {
        debug_assert!(round < self.rounds && stop.0 < self.stop_count);
        round * self.stop_count + stop.0
    }

    /// Number of rounds started, including round 0.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Arrival at `stop` found in exactly round `round`; `None` for rounds
    /// not started.
    pub fn arrival(&self, round: usize, stop: StopIdx) -> Option<TransitTime> {
        if round >= self.rounds {
            return None;
        }
        self.arrivals[self.slot(round, stop)]
    }

    /// Best arrival at `stop` over every round so far.
    pub fn best(&self, stop: StopIdx) -> Option<TransitTime> {
        self.best[stop.0]
    }

    pub fn back_pointer(&self, round: usize, stop: StopIdx) -> Option<BackPointer> {
        if round >= self.rounds {
            return None;
        }
        self.back[self.slot(round, stop)]
    }

    /// Returns true if `candidate` is strictly earlier than the round's label
    /// at `stop`, the stop's best label, and the best arrival at `target`.
    pub fn improves(
        &self,
        round: usize,
        stop: StopIdx,
        target: Option<StopIdx>,
        candidate: TransitTime,
    ) -> bool {
        let beats = |label: Option<TransitTime>| label.is_none_or(|t| candidate < t);
        beats(self.arrival(round, stop))
            && beats(self.best(stop))
            && target.is_none_or(|target| beats(self.best(target)))
    }

    /// Records an improved arrival at `stop` in `round`, which must have
    /// been started.
    pub fn set(&mut self, round: usize, stop: StopIdx, arrival: TransitTime, via: BackPointer) {
        let slot = self.slot(round, stop);
        self.arrivals[slot] = Some(arrival);
        self.back[slot] = Some(via);
        self.best[stop.0] = Some(arrival);
    }

    /// Best arrivals at every reached stop, in stop index order.
    pub fn reached(&self) -> impl Iterator<Item = (StopIdx, TransitTime)> + '_ {
        self.best
            .iter()
            .enumerate()
            .filter_map(|(idx, best)| best.map(|t| (StopIdx(idx), t)))
    }
}

/// Stops whose label improved in the current round.
#[derive(Debug, Clone)]
pub(crate) struct Marked {
    flags: Vec<bool>,
    stops: Vec<StopIdx>,
}

impl Marked {
    pub fn new(stop_count: usize) -> Self {
        Self {
            flags: vec![false; stop_count],
            stops: Vec::new(),
        }
    }

    pub fn insert(&mut self, stop: StopIdx) {
        if !self.flags[stop.0] {
            self.flags[stop.0] = true;
            self.stops.push(stop);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Empties the set, returning its stops in insertion order.
    pub fn take(&mut self) -> Vec<StopIdx> {
        for stop in &self.stops {
            self.flags[stop.0] = false;
        }
        std::mem::take(&mut self.stops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TransitTime {
        TransitTime::parse_hms(s).unwrap()
    }

    fn via(board: usize) -> BackPointer {
        BackPointer {
            route: RouteIdx(0),
            trip: 0,
            board_pos: 0,
            alight_pos: 1,
            board_stop: StopIdx(board),
        }
    }

    /// Labels from `origin` at 08:00 with `rounds` rounds started.
    fn started(stop_count: usize, origin: usize, rounds: usize) -> Labels {
        let mut labels = Labels::new(stop_count, StopIdx(origin), t("08:00:00"));
        for _ in 0..rounds {
            labels.start_round();
        }
        labels
    }

    #[test]
    fn origin_seeded_in_round_zero() {
        let labels = started(3, 1, 2);

        assert_eq!(labels.rounds(), 3);
        assert_eq!(labels.arrival(0, StopIdx(1)), Some(t("08:00:00")));
        assert_eq!(labels.arrival(1, StopIdx(1)), None);
        assert_eq!(labels.best(StopIdx(1)), Some(t("08:00:00")));
        assert_eq!(labels.best(StopIdx(0)), None);
        assert_eq!(labels.back_pointer(0, StopIdx(1)), None);
    }

    #[test]
    fn improvement_is_strict() {
        let mut labels = started(3, 0, 2);
        assert!(labels.improves(1, StopIdx(2), None, t("08:20:00")));

        labels.set(1, StopIdx(2), t("08:20:00"), via(0));
        assert!(!labels.improves(1, StopIdx(2), None, t("08:20:00")));
        assert!(!labels.improves(2, StopIdx(2), None, t("08:20:00")));
        assert!(labels.improves(2, StopIdx(2), None, t("08:19:59")));
        assert_eq!(labels.back_pointer(1, StopIdx(2)), Some(via(0)));
    }

    #[test]
    fn target_bound_prunes_later_candidates() {
        let mut labels = started(3, 0, 2);
        labels.set(1, StopIdx(2), t("08:20:00"), via(0));

        assert!(!labels.improves(1, StopIdx(1), Some(StopIdx(2)), t("08:25:00")));
        assert!(labels.improves(1, StopIdx(1), Some(StopIdx(2)), t("08:15:00")));
        assert!(labels.improves(1, StopIdx(1), None, t("08:25:00")));
    }

    #[test]
    fn reached_lists_best_labels() {
        let mut labels = started(3, 0, 1);
        labels.set(1, StopIdx(2), t("08:20:00"), via(0));

        let reached: Vec<_> = labels.reached().collect();
        assert_eq!(
            reached,
            vec![(StopIdx(0), t("08:00:00")), (StopIdx(2), t("08:20:00"))]
        );
    }

    #[test]
    fn rounds_are_added_on_demand() {
        let mut labels = Labels::new(2, StopIdx(0), t("08:00:00"));
        assert_eq!(labels.rounds(), 1);
        assert_eq!(labels.arrival(7, StopIdx(1)), None);
        assert_eq!(labels.back_pointer(7, StopIdx(1)), None);

        assert_eq!(labels.start_round(), 1);
        labels.set(1, StopIdx(1), t("08:30:00"), via(0));
        assert_eq!(labels.start_round(), 2);

        assert_eq!(labels.rounds(), 3);
        assert_eq!(labels.arrival(1, StopIdx(1)), Some(t("08:30:00")));
        assert_eq!(labels.arrival(2, StopIdx(1)), None);
        assert_eq!(labels.arrival(0, StopIdx(0)), Some(t("08:00:00")));
    }

    #[test]
    fn marked_deduplicates_and_resets() {
        let mut marked = Marked::new(4);
        marked.insert(StopIdx(3));
        marked.insert(StopIdx(1));
        marked.insert(StopIdx(3));

        assert_eq!(marked.take(), vec![StopIdx(3), StopIdx(1)]);
        assert!(marked.is_empty());

        marked.insert(StopIdx(3));
        assert_eq!(marked.take(), vec![StopIdx(3)]);
    }
}
