// ABOUTME: External API clients for nutrition data and the exercise catalog
// ABOUTME: Shared TTL caching and per-minute request budgeting for upstream proxies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! External service proxies.
//!
//! Both proxy clients share the same operational shape: an in-process TTL
//! cache so repeated lookups never hit the upstream, and a per-minute
//! request budget so a burst of users cannot exhaust the upstream quota.

/// Exercise catalog client (workout plan proxy)
pub mod exercise_catalog;
/// Nutrition data client (FoodData-Central-style proxy)
pub mod food_data;

pub use exercise_catalog::{CatalogExercise, ExerciseCatalogClient, ExerciseSearchPage};
pub use food_data::{FoodDataClient, FoodDetails, FoodNutrient, FoodSearchPage, FoodSearchResult};

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::time::sleep;

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

/// TTL cache over an arbitrary key
pub(crate) struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    fn new(ttl_secs: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Get an unexpired entry
    async fn get(&self, key: &K) -> Option<V> {
        let cache = self.entries.read().await;
        cache.get(key).and_then(|entry| {
            if Instant::now() < entry.expires_at {
                Some(entry.data.clone())
            } else {
                None
            }
        })
    }

    /// Insert an entry with the configured TTL
    async fn insert(&self, key: K, value: V) {
        let mut cache = self.entries.write().await;
        cache.insert(
            key,
            CacheEntry {
                data: value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop all entries (useful for testing)
    async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of cached entries (useful for monitoring)
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Sliding-window request budget for upstream calls
pub(crate) struct RequestBudget {
    requests: RwLock<Vec<Instant>>,
    limit: u32,
    window: Duration,
}

impl RequestBudget {
    fn per_minute(limit: u32) -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
            limit,
            window: Duration::from_secs(60),
        }
    }

    /// Block until a request slot is free, then consume it
    async fn acquire(&self) {
        loop {
            {
                let mut requests = self.requests.write().await;
                let now = Instant::now();
                requests.retain(|&t| now.duration_since(t) < self.window);
                if requests.len() < self.limit as usize {
                    requests.push(now);
                    return;
                }
            }
            // Window is full; check again shortly
            sleep(Duration::from_secs(1)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[tokio::test]
    async fn cache_serves_unexpired_entries() {
        let cache: TtlCache<String, u32> = TtlCache::new(60);
        cache.insert("a".to_owned(), 1).await;
        assert_eq!(cache.get(&"a".to_owned()).await, Some(1));
        assert_eq!(cache.get(&"b".to_owned()).await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn cache_never_serves_expired_entries() {
        let cache: TtlCache<String, u32> = TtlCache::new(0);
        cache.insert("a".to_owned(), 1).await;
        // TTL of zero expires immediately
        assert_eq!(cache.get(&"a".to_owned()).await, None);
    }

    #[tokio::test]
    async fn budget_allows_requests_under_the_limit() {
        let budget = RequestBudget::per_minute(3);
        budget.acquire().await;
        budget.acquire().await;
        budget.acquire().await;
        assert_eq!(budget.requests.read().await.len(), 3);
    }
}
