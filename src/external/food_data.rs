// ABOUTME: Nutrition data API client for food search and nutrient lookup
// ABOUTME: Proxies a FoodData-Central-style upstream with caching and request budgeting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Nutrition data client.
//!
//! Backs the `/api/nutrition/foods/*` proxy endpoints. The upstream is a
//! FoodData-Central-style API: free-text food search plus per-food
//! nutrient detail. Responses are cached for the configured TTL and
//! upstream calls are budgeted per minute.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RequestBudget, TtlCache};
use crate::config::ProxyServiceConfig;
use crate::errors::{AppError, AppResult};

const SERVICE_NAME: &str = "food data API";

/// One food hit from a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSearchResult {
    /// Upstream food identifier
    #[serde(rename = "fdcId")]
    pub food_id: i64,
    /// Food description
    pub description: String,
    /// Data source classification from the upstream
    #[serde(rename = "dataType", default)]
    pub data_type: Option<String>,
    /// Brand owner for branded foods
    #[serde(rename = "brandOwner", skip_serializing_if = "Option::is_none")]
    pub brand_owner: Option<String>,
}

/// A single nutrient amount (per 100g)
#[derive(Debug, Clone, Serialize)]
pub struct FoodNutrient {
    /// Nutrient name (e.g. "Protein", "Energy")
    pub name: String,
    /// Unit (e.g. "g", "kcal", "mg")
    pub unit: String,
    /// Amount per 100g
    pub amount: f64,
}

/// Detailed food information
#[derive(Debug, Clone, Serialize)]
pub struct FoodDetails {
    /// Upstream food identifier
    pub food_id: i64,
    /// Food description
    pub description: String,
    /// Nutrients with amounts
    pub nutrients: Vec<FoodNutrient>,
    /// Serving size, if published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<f64>,
    /// Serving size unit (e.g. "g", "cup")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size_unit: Option<String>,
}

/// Search response with pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct FoodSearchPage {
    /// Matching foods
    pub foods: Vec<FoodSearchResult>,
    /// Total matches in the upstream database
    pub total_hits: u32,
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Total pages available
    pub total_pages: u32,
}

/// Upstream search response (internal)
#[derive(Debug, Deserialize)]
struct SearchResponse {
    foods: Vec<FoodSearchResult>,
    #[serde(rename = "totalHits")]
    total_hits: Option<u32>,
    #[serde(rename = "currentPage")]
    current_page: Option<u32>,
    #[serde(rename = "totalPages")]
    total_pages: Option<u32>,
}

/// Upstream food details response (internal)
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(rename = "fdcId")]
    food_id: i64,
    description: String,
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<NutrientEntry>,
    #[serde(rename = "servingSize")]
    serving_size: Option<f64>,
    #[serde(rename = "servingSizeUnit")]
    serving_size_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NutrientEntry {
    nutrient: Option<NutrientInfo>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NutrientInfo {
    name: String,
    #[serde(rename = "unitName")]
    unit_name: String,
}

/// Nutrition data API client
pub struct FoodDataClient {
    config: ProxyServiceConfig,
    http_client: Client,
    search_cache: TtlCache<String, FoodSearchPage>,
    details_cache: TtlCache<i64, FoodDetails>,
    budget: RequestBudget,
}

impl FoodDataClient {
    /// Create a new client from proxy configuration
    #[must_use]
    pub fn new(config: ProxyServiceConfig) -> Self {
        let search_cache = TtlCache::new(config.cache_ttl_secs);
        let details_cache = TtlCache::new(config.cache_ttl_secs);
        let budget = RequestBudget::per_minute(config.rate_limit_per_minute);

        Self {
            config,
            http_client: Client::new(),
            search_cache,
            details_cache,
            budget,
        }
    }

    /// Search for foods by query string with pagination
    ///
    /// # Errors
    ///
    /// Returns an error for empty/oversized parameters or upstream failures
    pub async fn search_foods(
        &self,
        query: &str,
        page_size: u32,
        page_number: u32,
    ) -> AppResult<FoodSearchPage> {
        if query.trim().is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        if page_size == 0 || page_size > 200 {
            return Err(AppError::invalid_input(
                "Page size must be between 1 and 200",
            ));
        }
        if page_number == 0 {
            return Err(AppError::invalid_input(
                "Page number must be at least 1 (1-indexed)",
            ));
        }

        let cache_key = format!("{query}:{page_size}:{page_number}");
        if let Some(cached) = self.search_cache.get(&cache_key).await {
            return Ok(cached);
        }

        self.budget.acquire().await;

        let url = format!("{}/foods/search", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", &page_size.to_string()),
                ("pageNumber", &page_number.to_string()),
                ("api_key", &self.config.api_key),
            ])
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("Food search request failed with HTTP {status}"),
            ));
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("JSON parse error: {e}")))?;

        let page = FoodSearchPage {
            foods: search_response.foods,
            total_hits: search_response.total_hits.unwrap_or(0),
            current_page: search_response.current_page.unwrap_or(page_number),
            total_pages: search_response.total_pages.unwrap_or(1),
        };

        self.search_cache.insert(cache_key, page.clone()).await;
        Ok(page)
    }

    /// Get detailed nutrient information for one food
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream request fails or the food is unknown
    pub async fn get_food_details(&self, food_id: i64) -> AppResult<FoodDetails> {
        if let Some(cached) = self.details_cache.get(&food_id).await {
            return Ok(cached);
        }

        self.budget.acquire().await;

        let url = format!("{}/food/{food_id}", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", &self.config.api_key)])
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!("food {food_id}")));
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("Food details request failed with HTTP {status}"),
            ));
        }

        let details_response: DetailsResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("JSON parse error: {e}")))?;

        let nutrients: Vec<FoodNutrient> = details_response
            .food_nutrients
            .into_iter()
            .filter_map(|n| {
                let nutrient = n.nutrient?;
                Some(FoodNutrient {
                    name: nutrient.name,
                    unit: nutrient.unit_name,
                    amount: n.amount.unwrap_or(0.0),
                })
            })
            .collect();

        let details = FoodDetails {
            food_id: details_response.food_id,
            description: details_response.description,
            nutrients,
            serving_size: details_response.serving_size,
            serving_size_unit: details_response.serving_size_unit,
        };

        self.details_cache.insert(food_id, details.clone()).await;
        Ok(details)
    }

    /// Clear all caches (useful for testing)
    pub async fn clear_caches(&self) {
        self.search_cache.clear().await;
        self.details_cache.clear().await;
    }

    /// Get cache entry counts (useful for monitoring)
    pub async fn cache_stats(&self) -> (usize, usize) {
        (
            self.search_cache.len().await,
            self.details_cache.len().await,
        )
    }
}
