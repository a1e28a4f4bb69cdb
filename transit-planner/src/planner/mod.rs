//! Journey planner using round-based earliest-arrival search.
//!
//! This module answers: "leaving this stop at this time, when is the earliest
//! I can reach that stop, and how?"
//!
//! Each round boards one more vehicle than the last, so the round in which
//! the destination is first reached bounds the number of transfers. Working
//! state lives in per-query arrays indexed by dense stop index; the network
//! is only ever read.

mod config;
mod labels;
mod query;
mod raptor;
mod reconstruct;

#[cfg(test)]
mod search_tests;

pub use config::{DEFAULT_MAX_ROUNDS, QueryConfig};
pub use query::{Planner, QueryError, QueryOutcome, query};
