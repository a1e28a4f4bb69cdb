//! Compiled timetable snapshots.
//!
//! Parsing a large GTFS feed takes a while, so a loaded network can be
//! written out as JSON and read back on the next start. Reading a snapshot
//! goes through the same constructors as a fresh load, so a snapshot that
//! violates a network invariant is rejected rather than trusted.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Network;
use crate::domain::{NetworkError, Route, RouteId, Stop, StopId, StopTime, Trip, TripId};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from reading or writing snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading or writing the file failed
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid snapshot document
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was written by an incompatible version
    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    /// The snapshot decodes but describes an invalid network
    #[error("snapshot violates network invariants: {0}")]
    Network(#[from] NetworkError),
}

#[derive(Debug, Deserialize)]
struct Header {
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    stops: Vec<Stop>,
    routes: Vec<RouteRecord>,
    trips: Vec<TripRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RouteRecord {
    id: RouteId,
    name: String,
    stops: Vec<StopId>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TripRecord {
    id: TripId,
    route: RouteId,
    times: Vec<StopTime>,
}

impl Network {
    /// Serialize the network as a snapshot document.
    pub fn to_snapshot_json(&self) -> Result<String, SnapshotError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            stops: self.stops().iter().map(|s| Stop::clone(s)).collect(),
            routes: self
                .routes()
                .iter()
                .map(|r| RouteRecord {
                    id: r.id().clone(),
                    name: r.name().to_string(),
                    stops: r.stops().to_vec(),
                })
                .collect(),
            trips: self
                .trips()
                .map(|t| TripRecord {
                    id: t.id().clone(),
                    route: t.route_id().clone(),
                    times: t.stop_times().to_vec(),
                })
                .collect(),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuild a network from a snapshot document.
    pub fn from_snapshot_json(json: &str) -> Result<Self, SnapshotError> {
        let header: Header = serde_json::from_str(json)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: header.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let snapshot: Snapshot = serde_json::from_str(json)?;

        let routes = snapshot
            .routes
            .into_iter()
            .map(|r| Route::new(r.id, r.name, r.stops))
            .collect::<Result<Vec<_>, _>>()?;

        let by_id: HashMap<&RouteId, &Route> = routes.iter().map(|r| (r.id(), r)).collect();
        let trips = snapshot
            .trips
            .into_iter()
            .map(|t| {
                let route = by_id
                    .get(&t.route)
                    .ok_or_else(|| NetworkError::UnknownRoute {
                        trip: t.id.clone(),
                        route: t.route.clone(),
                    })?;
                Trip::from_ordered(t.id, route, t.times)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Network::new(snapshot.stops, routes, trips)?)
    }

    /// Write a snapshot to `path`.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_snapshot_json()?)?;
        info!(path = %path.display(), "Wrote timetable snapshot");
        Ok(())
    }

    /// Read a snapshot from `path`.
    pub fn load_snapshot(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)?;
        let network = Self::from_snapshot_json(&contents)?;
        info!(
            path = %path.display(),
            stops = network.stop_count(),
            routes = network.route_count(),
            trips = network.trip_count(),
            "Loaded timetable snapshot"
        );
        Ok(network)
    }
}
