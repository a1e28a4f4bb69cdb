//! Schedule time handling.
//!
//! Timetables give times as `HH:MM:SS` relative to midnight of the service
//! day. Hours past 23 are legal and mean the trip is still running after
//! midnight, so these are offsets rather than clock times. Timezone
//! normalisation is the loader's job.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

const SECS_PER_MINUTE: u32 = 60;
const SECS_PER_HOUR: u32 = 60 * SECS_PER_MINUTE;

/// A scheduled time in seconds since midnight of the service day.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::TransitTime;
///
/// let t = TransitTime::parse_hms("08:10:00").unwrap();
/// assert_eq!(t.seconds(), 8 * 3600 + 600);
/// assert_eq!(t.to_string(), "08:10:00");
///
/// // Service after midnight keeps counting hours
/// let late = TransitTime::parse_hms("25:05:00").unwrap();
/// assert_eq!(late.to_string(), "25:05:00");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitTime(u32);

impl TransitTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: Self = Self(0);

    /// Create a time from raw seconds since midnight.
    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Create a time from hours, minutes and seconds.
    ///
    /// Hours are unbounded; minutes and seconds must be below 60.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Result<Self, TimeError> {
        if minutes >= 60 {
            return Err(TimeError::new("minutes must be 0-59"));
        }
        if seconds >= 60 {
            return Err(TimeError::new("seconds must be 0-59"));
        }
        hours
            .checked_mul(SECS_PER_HOUR)
            .and_then(|h| h.checked_add(minutes * SECS_PER_MINUTE + seconds))
            .map(Self)
            .ok_or_else(|| TimeError::new("hours out of range"))
    }

    /// Parse `H:MM:SS` or `HH:MM:SS`, the format used by GTFS feeds.
    ///
    /// Surrounding whitespace is ignored. Hours may exceed 23.
    pub fn parse_hms(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 3 || !h.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hours: u32 = h
            .parse()
            .map_err(|_| TimeError::new("invalid hour digits"))?;
        let minutes =
            parse_two_digits(m.as_bytes()).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        let seconds = parse_two_digits(sec.as_bytes())
            .ok_or_else(|| TimeError::new("invalid second digits"))?;

        Self::from_hms(hours, minutes, seconds)
    }

    /// Returns seconds since midnight.
    pub const fn seconds(self) -> u32 {
        self.0
    }

    /// Returns the hour component (may exceed 23).
    pub fn hours(self) -> u32 {
        self.0 / SECS_PER_HOUR
    }

    /// Returns the minute component (0-59).
    pub fn minutes(self) -> u32 {
        (self.0 % SECS_PER_HOUR) / SECS_PER_MINUTE
    }

    /// Returns the second component (0-59).
    pub fn secs(self) -> u32 {
        self.0 % SECS_PER_MINUTE
    }

    /// Add a duration, returning `None` on overflow or if the result
    /// would fall before midnight.
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let total = i64::from(self.0).checked_add(duration.num_seconds())?;
        u32::try_from(total).ok().map(Self)
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(self, other: Self) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(other.0))
    }
}

impl FromStr for TransitTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hms(s)
    }
}

impl fmt::Debug for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitTime({self})")
    }
}

impl fmt::Display for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.secs()
        )
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
