//! Stop type.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::StopId;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A physical place where vehicles call.
///
/// Two stops with the same id are the same stop, whatever their names say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    id: StopId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinates: Option<Coordinates>,
}

impl Stop {
    /// Creates a stop without coordinates.
    pub fn new(id: StopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            coordinates: None,
        }
    }

    /// Attaches a position to the stop.
    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lon });
        self
    }

    pub fn id(&self) -> &StopId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }
}

impl PartialEq for Stop {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Stop {}

impl Hash for Stop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
