//! Domain types for the transit planner.
//!
//! This module contains the core value types of a scheduled transit network
//! and the journeys found over it. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod error;
mod ids;
mod journey;
mod leg;
mod route;
mod stop;
mod time;
mod trip;

pub use error::{DomainError, NetworkError};
pub use ids::{InvalidId, RouteId, StopId, TripId};
pub use journey::Journey;
pub use leg::{Leg, RouteStop};
pub use route::Route;
pub use stop::{Coordinates, Stop};
pub use time::{TimeError, TransitTime};
pub use trip::{StopTime, Trip};
