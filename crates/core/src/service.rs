//! Recommendation service shared by the HTTP and CLI surfaces.
//!
//! Holds the current engine snapshot and the response cache. Reloading data
//! swaps the snapshot and clears the cache together.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::cache::{CacheKey, RecommendationCache};
use crate::domain::DataSplit;
use crate::errors::DomainError;
use crate::recommend::{RecommendationEngine, RecommendationResponse};
use crate::weeks;

/// Engine plus a counter bumped on every swap, so results computed against a
/// replaced engine can be told apart.
#[derive(Debug)]
struct BoundEngine {
    generation: u64,
    engine: Arc<RecommendationEngine>,
}

#[derive(Debug)]
pub struct RecommendationService {
    bound: RwLock<BoundEngine>,
    cache: RecommendationCache,
    cache_enabled: bool,
}

impl RecommendationService {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self::with_cache(engine, true)
    }

    /// With `cache_enabled = false`, `use_cache` requests always recompute.
    pub fn with_cache(engine: RecommendationEngine, cache_enabled: bool) -> Self {
        Self {
            bound: RwLock::new(BoundEngine { generation: 0, engine: Arc::new(engine) }),
            cache: RecommendationCache::new(),
            cache_enabled,
        }
    }

    /// Current engine snapshot. The lock is released before the caller
    /// computes anything.
    pub fn engine(&self) -> Arc<RecommendationEngine> {
        self.snapshot().1
    }

    fn snapshot(&self) -> (u64, Arc<RecommendationEngine>) {
        let bound = self.bound.read().unwrap_or_else(PoisonError::into_inner);
        (bound.generation, Arc::clone(&bound.engine))
    }

    /// Cache `response` only if it was computed against the engine that is
    /// still bound. The read guard keeps `replace_engine` out until the
    /// insert is done.
    fn store(&self, generation: u64, key: CacheKey, response: &RecommendationResponse) -> bool {
        let bound = self.bound.read().unwrap_or_else(PoisonError::into_inner);
        if bound.generation != generation {
            debug!(
                event_name = "recommend.cache.stale",
                week = %key.week,
                "engine replaced during computation; not caching"
            );
            return false;
        }
        self.cache.insert(key, response)
    }

    pub fn cache(&self) -> &RecommendationCache {
        &self.cache
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn recommend(
        &self,
        target_date: &str,
        customer_filter: Option<&str>,
        use_cache: bool,
    ) -> Result<RecommendationResponse, DomainError> {
        let week = weeks::align(target_date)?;
        let customer_filter = customer_filter.filter(|customer| !customer.is_empty());
        let key = CacheKey::new(week, customer_filter);
        let use_cache = use_cache && self.cache_enabled;

        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                debug!(
                    event_name = "recommend.cache.hit",
                    week = %week,
                    customer = %key.customer,
                    "serving cached recommendation"
                );
                return Ok(cached);
            }
        }

        let (generation, engine) = self.snapshot();
        let response = engine.recommend_week(week, customer_filter);
        if use_cache && self.store(generation, key, &response) {
            debug!(event_name = "recommend.cache.stored", week = %week, "recommendation cached");
        }

        Ok(response)
    }

    /// Bind a freshly built engine. Callers already holding the previous
    /// snapshot finish against it.
    pub fn replace_engine(&self, engine: RecommendationEngine) -> usize {
        let mut bound = self.bound.write().unwrap_or_else(PoisonError::into_inner);
        bound.generation += 1;
        bound.engine = Arc::new(engine);
        let evicted = self.cache.clear();
        drop(bound);

        info!(event_name = "recommend.engine.replaced", evicted, "recommendation engine replaced");
        evicted
    }

    pub fn clear_cache(&self) -> usize {
        let evicted = self.cache.clear();
        info!(event_name = "recommend.cache.cleared", evicted, "recommendation cache cleared");
        evicted
    }

    pub fn customers(&self) -> Vec<String> {
        self.engine().customers()
    }

    pub fn available_weeks(&self, split: Option<DataSplit>) -> Vec<NaiveDate> {
        self.engine().available_weeks(split)
    }
}
