//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedPlanner;
use crate::network::Network;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached journey planner, which also owns the network
    pub planner: Arc<CachedPlanner>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: CachedPlanner) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }

    pub fn network(&self) -> &Network {
        self.planner.network()
    }
}
