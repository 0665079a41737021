// ABOUTME: Nutrition logging route handlers and food search proxy
// ABOUTME: CRUD for meal entries, daily macro summaries, and proxied nutrition data lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Nutrition routes.
//!
//! Meal entries follow the same ownership scoping as activities. The
//! `/foods` endpoints proxy the external nutrition data service so
//! clients never talk to it (or carry its API key) directly.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthResult,
    context::ServerResources,
    errors::{AppError, AppResult},
    models::{MealType, NutritionEntry},
    validation,
};

/// Create/replace payload for a nutrition entry
#[derive(Debug, Deserialize)]
pub struct NutritionPayload {
    /// When the food was consumed
    pub logged_at: DateTime<Utc>,
    /// Meal slot (`breakfast`, `lunch`, `dinner`, `snack`)
    pub meal: String,
    /// What was eaten
    pub description: String,
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein_g: Option<f64>,
    /// Carbohydrates in grams
    pub carbs_g: Option<f64>,
    /// Fat in grams
    pub fat_g: Option<f64>,
    /// External food id, when the entry came from search
    pub food_ref: Option<i64>,
}

/// Query parameters for entry listing
#[derive(Debug, Deserialize)]
pub struct ListNutritionQuery {
    /// Restrict to one UTC calendar day
    pub date: Option<NaiveDate>,
    /// Range start (used when `date` is absent; default: 7 days ago)
    pub from: Option<DateTime<Utc>>,
    /// Range end (exclusive; default: now)
    pub to: Option<DateTime<Utc>>,
}

/// Query parameters for the daily macro summary
#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    /// Trailing window length in days (default 7, max 90)
    pub days: Option<i64>,
}

/// Query parameters for food search
#[derive(Debug, Deserialize)]
pub struct FoodSearchQuery {
    /// Free-text search term
    pub q: String,
    /// Results per page (default 20)
    pub page_size: Option<u32>,
    /// Page number, 1-indexed (default 1)
    pub page: Option<u32>,
}

/// Nutrition service for business logic
#[derive(Clone)]
pub struct NutritionService {
    resources: Arc<ServerResources>,
}

impl NutritionService {
    /// Creates a new nutrition service
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Validate a payload and build the stored entry
    fn build_entry(
        user_id: Uuid,
        id: Uuid,
        payload: NutritionPayload,
    ) -> AppResult<NutritionEntry> {
        let meal: MealType = payload
            .meal
            .parse()
            .map_err(|e: String| AppError::invalid_input(e))?;

        validation::validate_text(
            "description",
            &payload.description,
            validation::MAX_TEXT_LENGTH,
        )?;
        validation::validate_optional_f64("calories", Some(payload.calories), 50_000.0)?;
        validation::validate_optional_f64("protein_g", payload.protein_g, 5_000.0)?;
        validation::validate_optional_f64("carbs_g", payload.carbs_g, 5_000.0)?;
        validation::validate_optional_f64("fat_g", payload.fat_g, 5_000.0)?;

        Ok(NutritionEntry {
            id,
            user_id,
            logged_at: payload.logged_at,
            meal,
            description: validation::sanitize_text(&payload.description),
            calories: payload.calories,
            protein_g: payload.protein_g,
            carbs_g: payload.carbs_g,
            fat_g: payload.fat_g,
            food_ref: payload.food_ref,
            created_at: Utc::now(),
        })
    }

    /// Log a new entry
    ///
    /// # Errors
    /// Returns error if validation or the insert fails
    pub async fn create(
        &self,
        auth: &AuthResult,
        payload: NutritionPayload,
    ) -> AppResult<NutritionEntry> {
        auth.require_active()?;
        let entry = Self::build_entry(auth.user_id, Uuid::new_v4(), payload)?;
        self.resources.database.create_nutrition_entry(&entry).await?;
        Ok(entry)
    }

    /// Replace an existing entry
    ///
    /// # Errors
    /// Returns error if validation fails or the entry does not exist
    pub async fn update(
        &self,
        auth: &AuthResult,
        entry_id: Uuid,
        payload: NutritionPayload,
    ) -> AppResult<NutritionEntry> {
        auth.require_active()?;
        let entry = Self::build_entry(auth.user_id, entry_id, payload)?;
        self.resources.database.update_nutrition_entry(&entry).await
    }

    /// Resolve a listing query into a concrete time range
    fn resolve_range(query: &ListNutritionQuery) -> (DateTime<Utc>, DateTime<Utc>) {
        if let Some(date) = query.date {
            let start = date.and_hms_opt(0, 0, 0).map_or_else(Utc::now, |dt| {
                DateTime::from_naive_utc_and_offset(dt, Utc)
            });
            return (start, start + Duration::days(1));
        }

        let to = query.to.unwrap_or_else(Utc::now);
        let from = query.from.unwrap_or(to - Duration::days(7));
        (from, to)
    }
}

/// Nutrition routes (axum)
pub struct NutritionRoutes;

impl NutritionRoutes {
    /// Create all nutrition routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/nutrition",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/nutrition/summary/daily",
                get(Self::handle_daily_summary),
            )
            .route("/api/nutrition/foods/search", get(Self::handle_food_search))
            .route("/api/nutrition/foods/:food_id", get(Self::handle_food_details))
            .route(
                "/api/nutrition/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Log a new nutrition entry
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(payload): Json<NutritionPayload>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = NutritionService::new(resources);
        let entry = service.create(&auth, payload).await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// List entries for a day or range
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListNutritionQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let (from, to) = NutritionService::resolve_range(&query);
        let entries = resources
            .database
            .list_nutrition_entries(auth.user_id, from, to)
            .await?;

        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Get one entry
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let entry = resources
            .database
            .get_nutrition_entry(entry_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("nutrition entry {entry_id}")))?;

        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    /// Replace one entry
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<Uuid>,
        Json(payload): Json<NutritionPayload>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = NutritionService::new(resources);
        let entry = service.update(&auth, entry_id, payload).await?;
        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    /// Delete one entry
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_active()?;

        resources
            .database
            .delete_nutrition_entry(entry_id, auth.user_id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Daily macro totals over a trailing window
    async fn handle_daily_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<DailySummaryQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let days = query.days.unwrap_or(7).clamp(1, 90);
        let to = Utc::now();
        let from = to - Duration::days(days);

        let totals = resources
            .database
            .get_daily_macro_totals(auth.user_id, from, to)
            .await?;

        Ok((StatusCode::OK, Json(totals)).into_response())
    }

    /// Proxy: food search against the nutrition data service
    async fn handle_food_search(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<FoodSearchQuery>,
    ) -> Result<Response, AppError> {
        let _auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let page = resources
            .food_data
            .search_foods(
                &query.q,
                query.page_size.unwrap_or(20),
                query.page.unwrap_or(1),
            )
            .await?;

        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Proxy: nutrient details for one food
    async fn handle_food_details(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(food_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let _auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let details = resources.food_data.get_food_details(food_id).await?;
        Ok((StatusCode::OK, Json(details)).into_response())
    }
}
