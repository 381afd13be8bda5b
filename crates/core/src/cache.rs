//! In-process cache of successful recommendation responses.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;

use crate::recommend::RecommendationResponse;

/// Cache slot used when no customer filter is applied.
pub const ALL_CUSTOMERS_KEY: &str = "all";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub week: NaiveDate,
    pub customer: String,
}

impl CacheKey {
    pub fn new(week: NaiveDate, customer_filter: Option<&str>) -> Self {
        let customer = customer_filter
            .filter(|customer| !customer.is_empty())
            .unwrap_or(ALL_CUSTOMERS_KEY)
            .to_owned();
        Self { week, customer }
    }
}

#[derive(Debug, Default)]
pub struct RecommendationCache {
    entries: RwLock<HashMap<CacheKey, RecommendationResponse>>,
}

impl RecommendationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<RecommendationResponse> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Stores `response` only when it succeeded. Returns whether it was stored.
    pub fn insert(&self, key: CacheKey, response: &RecommendationResponse) -> bool {
        if !response.success {
            return false;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, response.clone());
        true
    }

    /// Drops every entry and returns how many were evicted.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let evicted = entries.len();
        entries.clear();
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::recommend::RecommendationResponse;

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 26).expect("valid date")
    }

    fn successful(week: NaiveDate) -> RecommendationResponse {
        RecommendationResponse {
            success: true,
            week,
            week_label: crate::weeks::week_range_label(week),
            rows: Vec::new(),
            summary: None,
            error: None,
        }
    }

    #[test]
    fn unfiltered_and_empty_filters_share_the_all_slot() {
        assert_eq!(CacheKey::new(week(), None), CacheKey::new(week(), Some("")));
        assert_eq!(CacheKey::new(week(), None).customer, "all");
        assert_ne!(CacheKey::new(week(), None), CacheKey::new(week(), Some("Acme")));
    }

    #[test]
    fn failed_responses_are_not_cached() {
        let cache = RecommendationCache::new();
        let failed = RecommendationResponse::unavailable(week(), "Prediction data not available");

        assert!(!cache.insert(CacheKey::new(week(), None), &failed));
        assert!(cache.is_empty());
        assert!(cache.get(&CacheKey::new(week(), None)).is_none());
    }

    #[test]
    fn clear_reports_evicted_entries_and_empties_cache() {
        let cache = RecommendationCache::new();
        assert!(cache.insert(CacheKey::new(week(), None), &successful(week())));
        assert!(cache.insert(CacheKey::new(week(), Some("Acme")), &successful(week())));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&CacheKey::new(week(), Some("Acme"))), Some(successful(week())));
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.clear(), 0);
    }
}
