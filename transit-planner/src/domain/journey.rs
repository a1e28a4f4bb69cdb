//! Journey type.
//!
//! A `Journey` is an ordered list of legs taking a traveller from an origin
//! to a destination, together with the time they asked to leave.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use super::{DomainError, Leg, Stop, TransitTime};

/// A complete journey from origin to destination.
///
/// "No journey" is never an empty `Journey`; callers get an explicit
/// absent result instead.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs share a stop (alight stop = next board stop)
/// - Each leg departs no earlier than the previous one arrives
/// - The first leg departs no earlier than the requested departure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    requested_departure: TransitTime,
    legs: Vec<Leg>,
}

impl Journey {
    /// Constructs a journey, validating that its legs chain together.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `legs` is empty
    /// - A leg does not board where the previous one alighted
    /// - A leg departs before the previous one arrives
    /// - The first leg departs before `requested_departure`
    pub fn new(requested_departure: TransitTime, legs: Vec<Leg>) -> Result<Self, DomainError> {
        let first = legs.first().ok_or(DomainError::EmptyJourney)?;
        if first.departure_time() < requested_departure {
            return Err(DomainError::DepartsBeforeRequest);
        }

        for window in legs.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            if prev.alight_stop() != next.board_stop() {
                return Err(DomainError::LegsNotConnected(
                    prev.alight_stop().id().clone(),
                    next.board_stop().id().clone(),
                ));
            }
            if prev.arrival_time() > next.departure_time() {
                return Err(DomainError::MissedConnection(
                    next.board_stop().id().clone(),
                ));
            }
        }

        Ok(Self {
            requested_departure,
            legs,
        })
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the number of legs.
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Returns the number of transfers (legs - 1).
    pub fn transfer_count(&self) -> usize {
        self.legs.len() - 1
    }

    /// Returns true if this is a direct journey (no transfers).
    pub fn is_direct(&self) -> bool {
        self.legs.len() == 1
    }

    /// The first leg; always present.
    fn first_leg(&self) -> &Leg {
        &self.legs[0]
    }

    /// The last leg; always present.
    fn last_leg(&self) -> &Leg {
        &self.legs[self.legs.len() - 1]
    }

    /// Returns the origin stop.
    pub fn origin(&self) -> &Arc<Stop> {
        self.first_leg().board_stop()
    }

    /// Returns the destination stop.
    pub fn destination(&self) -> &Arc<Stop> {
        self.last_leg().alight_stop()
    }

    /// Returns the time the traveller asked to leave.
    pub fn requested_departure(&self) -> TransitTime {
        self.requested_departure
    }

    /// Returns the departure time of the first leg.
    pub fn departure_time(&self) -> TransitTime {
        self.first_leg().departure_time()
    }

    /// Returns the arrival time of the last leg.
    pub fn arrival_time(&self) -> TransitTime {
        self.last_leg().arrival_time()
    }

    /// Returns arrival minus the requested departure, waiting included.
    pub fn total_duration(&self) -> Duration {
        self.arrival_time()
            .signed_duration_since(self.requested_departure)
    }

    /// Returns the time spent waiting between legs.
    pub fn total_wait(&self) -> Duration {
        self.legs
            .windows(2)
            .map(|w| w[1].departure_time().signed_duration_since(w[0].arrival_time()))
            .sum()
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Journey from {} to {}",
            self.origin().name(),
            self.destination().name()
        )?;
        writeln!(f, "  Departure: {}", self.requested_departure)?;
        writeln!(f, "  Arrival: {}", self.arrival_time())?;
        writeln!(f, "  Duration: {} minutes", self.total_duration().num_minutes())?;
        writeln!(f, "  Transfers: {}", self.transfer_count())?;
        writeln!(f, "  Waiting: {} minutes", self.total_wait().num_minutes())?;
        write!(f, "  Legs: {}", self.leg_count())?;
        for (i, leg) in self.legs.iter().enumerate() {
            write!(
                f,
                "\n    {}. {} -> {} on {} (trip {}), {} -> {}",
                i + 1,
                leg.board_stop().name(),
                leg.alight_stop().name(),
                leg.route().name(),
                leg.trip().id(),
                leg.departure_time(),
                leg.arrival_time()
            )?;
        }
        Ok(())
    }
}
