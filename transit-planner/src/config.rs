//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::planner::DEFAULT_MAX_ROUNDS;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Error reading the server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("set TRANSIT_GTFS_PATH or TRANSIT_SNAPSHOT")]
    NoSource,

    #[error("TRANSIT_GTFS_URL needs TRANSIT_GTFS_PATH to download into")]
    UrlWithoutPath,

    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// GTFS feed, a directory or a `.zip` archive
    pub gtfs_path: Option<PathBuf>,
    /// Keep only trips running on this day
    pub service_date: Option<NaiveDate>,
    /// Compiled timetable: loaded if present, written after a GTFS load
    pub snapshot: Option<PathBuf>,
    /// Fetch the feed from here before loading
    pub gtfs_url: Option<String>,
    pub bind: SocketAddr,
    pub max_rounds: usize,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let gtfs_path = get("TRANSIT_GTFS_PATH").map(PathBuf::from);
        let snapshot = get("TRANSIT_SNAPSHOT").map(PathBuf::from);
        let gtfs_url = get("TRANSIT_GTFS_URL");

        if gtfs_path.is_none() && snapshot.is_none() {
            return Err(ConfigError::NoSource);
        }
        if gtfs_url.is_some() && gtfs_path.is_none() {
            return Err(ConfigError::UrlWithoutPath);
        }

        let service_date = get("TRANSIT_SERVICE_DATE")
            .map(|value| {
                NaiveDate::parse_from_str(value.trim(), "%Y%m%d").map_err(|_| {
                    ConfigError::Invalid {
                        var: "TRANSIT_SERVICE_DATE",
                        value,
                    }
                })
            })
            .transpose()?;

        let bind = parse_bind(get("TRANSIT_BIND"))?;

        let max_rounds = match get("TRANSIT_MAX_ROUNDS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "TRANSIT_MAX_ROUNDS",
                        value,
                    });
                }
            },
            None => DEFAULT_MAX_ROUNDS,
        };

        Ok(Self {
            gtfs_path,
            service_date,
            snapshot,
            gtfs_url,
            bind,
            max_rounds,
        })
    }

    /// Where a downloaded feed archive is written.
    ///
    /// A `.zip` feed path is the archive itself; a directory feed gets a
    /// sibling archive that is extracted into it.
    pub fn archive_path(&self) -> Option<PathBuf> {
        let path = self.gtfs_path.as_deref()?;
        if is_zip(path) {
            Some(path.to_path_buf())
        } else {
            Some(path.with_extension("zip"))
        }
    }
}

/// True if `path` names a zip archive.
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn parse_bind(value: Option<String>) -> Result<SocketAddr, ConfigError> {
    let value = value.unwrap_or_else(|| DEFAULT_BIND.to_string());
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var: "TRANSIT_BIND",
        value,
    })
}
