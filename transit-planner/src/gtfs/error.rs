//! GTFS loading error types.

use crate::domain::{InvalidId, NetworkError, TimeError};

/// Errors that can occur while fetching or loading a GTFS feed.
#[derive(Debug, thiserror::Error)]
pub enum GtfsError {
    /// Reading or writing feed files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A feed file is not valid CSV for its record type
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    /// The feed archive could not be read
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A required feed file is absent
    #[error("feed has no {0}")]
    MissingFile(&'static str),

    /// A stop time is not a valid GTFS time
    #[error("invalid time {value:?} on trip {trip}: {source}")]
    InvalidTime {
        trip: String,
        value: String,
        #[source]
        source: TimeError,
    },

    /// A date is not in YYYYMMDD form
    #[error("invalid date {0:?}: expected YYYYMMDD")]
    InvalidDate(String),

    /// An identifier column is blank
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] InvalidId),

    /// The feed parses but violates network invariants
    #[error("feed violates network invariants: {0}")]
    Network(#[from] NetworkError),

    /// Fetching the feed over HTTP failed
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
}
