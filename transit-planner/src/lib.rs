//! Transit journey planner.
//!
//! Answers "what is the earliest I can get from stop A to stop B if I leave
//! at time T?" over a static timetable, using a round-based (RAPTOR)
//! search. Timetables are loaded from GTFS feeds and served over HTTP.

pub mod cache;
pub mod config;
pub mod domain;
pub mod gtfs;
pub mod network;
pub mod planner;
pub mod web;
