//! Caching layer for journey queries.
//!
//! A query is a pure function of (origin, destination, departure, rounds)
//! over an immutable network, so outcomes can be memoised without any
//! invalidation beyond a TTL. Errors are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{StopId, TransitTime};
use crate::network::Network;
use crate::planner::{QueryConfig, QueryError, QueryOutcome, query};

/// Cache key: (origin, destination, departure, max rounds).
type QueryKey = (StopId, StopId, TransitTime, usize);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
        }
    }
}

/// Error from a cached query.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The blocking search task panicked or was cancelled
    #[error("search task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Planner over a shared network, with memoised outcomes.
///
/// Searches run on tokio's blocking pool so a slow query never stalls the
/// async workers serving other requests.
pub struct CachedPlanner {
    network: Arc<Network>,
    config: QueryConfig,
    outcomes: MokaCache<QueryKey, Arc<QueryOutcome>>,
}

impl CachedPlanner {
    /// Create a new cached planner.
    pub fn new(network: Arc<Network>, config: QueryConfig, cache_config: &CacheConfig) -> Self {
        let outcomes = MokaCache::builder()
            .time_to_live(cache_config.ttl)
            .max_capacity(cache_config.max_capacity)
            .build();

        Self {
            network,
            config,
            outcomes,
        }
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Plan a journey, using the cache if available.
    ///
    /// `max_rounds` defaults to the configured budget.
    pub async fn plan(
        &self,
        origin: &StopId,
        destination: &StopId,
        departure: TransitTime,
        max_rounds: Option<usize>,
    ) -> Result<Arc<QueryOutcome>, PlanError> {
        let max_rounds = max_rounds.unwrap_or(self.config.max_rounds);
        let key = (origin.clone(), destination.clone(), departure, max_rounds);

        if let Some(cached) = self.outcomes.get(&key).await {
            debug!(%origin, %destination, %departure, "Query cache hit");
            return Ok(cached);
        }

        let network = Arc::clone(&self.network);
        let (from, to) = (origin.clone(), destination.clone());
        let outcome = tokio::task::spawn_blocking(move || {
            query(&network, &from, &to, departure, max_rounds)
        })
        .await??;

        let outcome = Arc::new(outcome);
        self.outcomes.insert(key, Arc::clone(&outcome)).await;
        Ok(outcome)
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.outcomes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.outcomes.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::tests::{fixture, stop_id, t};

    fn planner() -> CachedPlanner {
        CachedPlanner::new(
            Arc::new(fixture()),
            QueryConfig::default(),
            &CacheConfig::default(),
        )
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[tokio::test]
    async fn caches_outcomes() {
        let planner = planner();
        let first = planner
            .plan(&stop_id("A"), &stop_id("C"), t("08:00:00"), None)
            .await
            .unwrap();
        let second = planner
            .plan(&stop_id("A"), &stop_id("C"), t("08:00:00"), None)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        planner.outcomes.run_pending_tasks().await;
        assert_eq!(planner.entry_count(), 1);
    }

    #[tokio::test]
    async fn rounds_are_part_of_the_key() {
        let planner = planner();
        let default = planner
            .plan(&stop_id("A"), &stop_id("C"), t("08:00:00"), None)
            .await
            .unwrap();
        let one = planner
            .plan(&stop_id("A"), &stop_id("C"), t("08:00:00"), Some(1))
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&default, &one));
        planner.outcomes.run_pending_tasks().await;
        assert_eq!(planner.entry_count(), 2);
    }

    #[tokio::test]
    async fn matches_uncached_query() {
        let planner = planner();
        let network = fixture();
        for (from, to, at) in [("A", "C", "08:00:00"), ("A", "D", "07:00:00"), ("B", "A", "09:00:00")] {
            let cached = planner
                .plan(&stop_id(from), &stop_id(to), t(at), None)
                .await
                .unwrap();
            let direct = query(&network, &stop_id(from), &stop_id(to), t(at), 5).unwrap();
            assert_eq!(*cached, direct);
        }
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let planner = planner();
        let result = planner
            .plan(&stop_id("NOWHERE"), &stop_id("C"), t("08:00:00"), None)
            .await;

        assert!(matches!(
            result,
            Err(PlanError::Query(QueryError::UnknownStop(_)))
        ));
        planner.outcomes.run_pending_tasks().await;
        assert_eq!(planner.entry_count(), 0);
    }

    #[tokio::test]
    async fn invalidate_clears_entries() {
        let planner = planner();
        planner
            .plan(&stop_id("A"), &stop_id("C"), t("08:00:00"), None)
            .await
            .unwrap();
        planner.invalidate_all();
        planner.outcomes.run_pending_tasks().await;
        assert_eq!(planner.entry_count(), 0);
    }
}
