//! Identifier types for stops, routes and trips.
//!
//! Identifiers come straight from the feed and are opaque strings. The
//! only thing we insist on is that they are non-empty after trimming.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an empty identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: must not be empty")]
pub struct InvalidId {
    kind: &'static str,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Arc<str>);

        impl $name {
            /// Parse an identifier, trimming surrounding whitespace.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(InvalidId { kind: $kind });
                }
                Ok(Self(Arc::from(trimmed)))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_id!(
    /// Identifier of a stop.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::StopId;
    ///
    /// let id = StopId::parse(" 8530813 ").unwrap();
    /// assert_eq!(id.as_str(), "8530813");
    ///
    /// assert!(StopId::parse("   ").is_err());
    /// ```
    StopId,
    "stop"
);

define_id!(
    /// Identifier of a route (one fixed calling pattern).
    RouteId,
    "route"
);

define_id!(
    /// Identifier of a trip.
    TripId,
    "trip"
);
