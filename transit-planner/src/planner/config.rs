//! Query configuration for the journey planner.

/// Rounds used when a caller does not ask for a specific number.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Configuration parameters for journey queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Maximum number of vehicles boarded in one journey.
    /// A journey uses at most `max_rounds - 1` transfers.
    pub max_rounds: usize,
}

impl QueryConfig {
    /// Create a new configuration with the given round budget.
    pub fn new(max_rounds: usize) -> Self {
        Self { max_rounds }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}
