// ABOUTME: Exercise catalog API client for workout plan building
// ABOUTME: Proxies a wger-style exercise database with caching and request budgeting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Exercise catalog client.
//!
//! Backs the `/api/workouts/exercises/search` proxy endpoint. The upstream
//! is a wger-style exercise database: paged search across exercises with
//! muscle and equipment metadata. Catalog hits can be dropped straight
//! into a workout plan as `PlannedExercise` slots.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RequestBudget, TtlCache};
use crate::config::ProxyServiceConfig;
use crate::errors::{AppError, AppResult};

const SERVICE_NAME: &str = "exercise catalog API";

/// One exercise from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogExercise {
    /// Upstream exercise identifier
    pub id: i64,
    /// Exercise name
    pub name: String,
    /// Exercise description (may contain upstream HTML; passed through verbatim)
    #[serde(default)]
    pub description: String,
    /// Category name (e.g. "Legs", "Chest")
    #[serde(default)]
    pub category: Option<String>,
    /// Primary muscles worked
    #[serde(default)]
    pub muscles: Vec<String>,
    /// Equipment needed
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// One page of exercise search results
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSearchPage {
    /// Matching exercises
    pub exercises: Vec<CatalogExercise>,
    /// Total matches upstream
    pub total: u32,
    /// Current page number (1-indexed)
    pub page: u32,
}

/// Upstream paged response (internal)
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    count: Option<u32>,
    #[serde(default)]
    results: Vec<CatalogExercise>,
}

/// Exercise catalog API client
pub struct ExerciseCatalogClient {
    config: ProxyServiceConfig,
    http_client: Client,
    search_cache: TtlCache<String, ExerciseSearchPage>,
    budget: RequestBudget,
}

impl ExerciseCatalogClient {
    /// Create a new client from proxy configuration
    #[must_use]
    pub fn new(config: ProxyServiceConfig) -> Self {
        let search_cache = TtlCache::new(config.cache_ttl_secs);
        let budget = RequestBudget::per_minute(config.rate_limit_per_minute);

        Self {
            config,
            http_client: Client::new(),
            search_cache,
            budget,
        }
    }

    /// Search the exercise catalog
    ///
    /// # Arguments
    /// * `query` - Free-text search term
    /// * `muscle` - Optional muscle filter (upstream vocabulary)
    /// * `equipment` - Optional equipment filter (upstream vocabulary)
    /// * `page` - Page number (1-indexed)
    ///
    /// # Errors
    ///
    /// Returns an error for empty parameters or upstream failures
    pub async fn search_exercises(
        &self,
        query: &str,
        muscle: Option<&str>,
        equipment: Option<&str>,
        page: u32,
    ) -> AppResult<ExerciseSearchPage> {
        if query.trim().is_empty() && muscle.is_none() && equipment.is_none() {
            return Err(AppError::invalid_input(
                "Provide a search term, muscle, or equipment filter",
            ));
        }
        if page == 0 {
            return Err(AppError::invalid_input(
                "Page number must be at least 1 (1-indexed)",
            ));
        }

        let cache_key = format!(
            "{query}:{}:{}:{page}",
            muscle.unwrap_or(""),
            equipment.unwrap_or("")
        );
        if let Some(cached) = self.search_cache.get(&cache_key).await {
            return Ok(cached);
        }

        self.budget.acquire().await;

        let url = format!("{}/exercise/search", self.config.base_url);
        let mut request = self.http_client.get(&url).query(&[
            ("term", query),
            ("page", &page.to_string()),
            ("format", "json"),
        ]);
        if let Some(m) = muscle {
            request = request.query(&[("muscle", m)]);
        }
        if let Some(e) = equipment {
            request = request.query(&[("equipment", e)]);
        }
        if !self.config.api_key.is_empty() {
            request = request.header("Authorization", format!("Token {}", self.config.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("Exercise search request failed with HTTP {status}"),
            ));
        }

        let catalog_response: CatalogResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("JSON parse error: {e}")))?;

        let page_result = ExerciseSearchPage {
            total: catalog_response
                .count
                .unwrap_or(u32::try_from(catalog_response.results.len()).unwrap_or(0)),
            exercises: catalog_response.results,
            page,
        };

        self.search_cache.insert(cache_key, page_result.clone()).await;
        Ok(page_result)
    }

    /// Clear the search cache (useful for testing)
    pub async fn clear_caches(&self) {
        self.search_cache.clear().await;
    }
}
