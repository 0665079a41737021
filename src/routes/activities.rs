// ABOUTME: Activity logging route handlers
// ABOUTME: CRUD, filtered listing, weekly summary, and streak endpoints for workout sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Activity routes.
//!
//! Sessions belong to the authenticated user; ownership is enforced by
//! scoping every query to the caller's id, so a foreign activity id
//! simply reads as not found. The summary endpoints delegate grouping
//! and summing to SQL and only fold window totals here; the streak
//! endpoint runs the linear scan in [`crate::streaks`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::AuthResult,
    context::ServerResources,
    database::{ActivityFilter, WeeklySummary},
    errors::{AppError, AppResult},
    models::{Activity, SportType},
    pagination::PaginationParams,
    streaks::{self, StreakSummary},
    validation,
};

/// Create/replace payload for an activity
#[derive(Debug, Deserialize)]
pub struct ActivityPayload {
    /// Sport discipline (`run`, `ride`, `swim`, `walk`, `strength`, `yoga`, `other`)
    pub sport: String,
    /// Short title
    pub title: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// Session length in seconds
    pub duration_seconds: i64,
    /// Distance covered in meters
    pub distance_meters: Option<f64>,
    /// Estimated energy expenditure in kcal
    pub calories: Option<f64>,
    /// Average heart rate in bpm
    pub average_heart_rate: Option<i32>,
    /// Maximum heart rate in bpm
    pub max_heart_rate: Option<i32>,
    /// Rate of perceived exertion, 1-10
    pub perceived_exertion: Option<i32>,
}

/// Query parameters for activity listing
#[derive(Debug, Deserialize)]
pub struct ListActivitiesQuery {
    /// Restrict to one sport
    pub sport: Option<String>,
    /// Only activities starting at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only activities starting before this instant
    pub to: Option<DateTime<Utc>>,
    /// Resume cursor from a previous page
    pub cursor: Option<String>,
    /// Page size (1-200)
    pub limit: Option<usize>,
}

/// Activity service for business logic
#[derive(Clone)]
pub struct ActivityService {
    resources: Arc<ServerResources>,
}

impl ActivityService {
    /// Creates a new activity service
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Validate a payload and build the stored activity
    fn build_activity(
        user_id: Uuid,
        id: Uuid,
        payload: ActivityPayload,
    ) -> AppResult<Activity> {
        let sport: SportType = payload
            .sport
            .parse()
            .map_err(|e: String| AppError::invalid_input(e))?;

        validation::validate_text("title", &payload.title, validation::MAX_TITLE_LENGTH)?;
        validation::validate_optional_text(
            "notes",
            payload.notes.as_deref(),
            validation::MAX_TEXT_LENGTH,
        )?;
        validation::validate_range_i64(
            "duration_seconds",
            payload.duration_seconds,
            1,
            validation::MAX_ACTIVITY_DURATION_SECS,
        )?;
        validation::validate_optional_f64(
            "distance_meters",
            payload.distance_meters,
            validation::MAX_DISTANCE_METERS,
        )?;
        validation::validate_optional_f64("calories", payload.calories, 50_000.0)?;
        validation::validate_optional_heart_rate("average_heart_rate", payload.average_heart_rate)?;
        validation::validate_optional_heart_rate("max_heart_rate", payload.max_heart_rate)?;
        if let Some(rpe) = payload.perceived_exertion {
            validation::validate_range_i64("perceived_exertion", i64::from(rpe), 1, 10)?;
        }

        let now = Utc::now();
        Ok(Activity {
            id,
            user_id,
            sport,
            title: validation::sanitize_text(&payload.title),
            notes: validation::sanitize_optional_text(payload.notes.as_deref()),
            started_at: payload.started_at,
            duration_seconds: payload.duration_seconds,
            distance_meters: payload.distance_meters,
            calories: payload.calories,
            average_heart_rate: payload.average_heart_rate,
            max_heart_rate: payload.max_heart_rate,
            perceived_exertion: payload.perceived_exertion,
            created_at: now,
            updated_at: now,
        })
    }

    /// Log a new activity
    ///
    /// # Errors
    /// Returns error if validation or the insert fails
    pub async fn create(&self, auth: &AuthResult, payload: ActivityPayload) -> AppResult<Activity> {
        auth.require_active()?;
        let activity = Self::build_activity(auth.user_id, Uuid::new_v4(), payload)?;
        self.resources.database.create_activity(&activity).await?;
        debug!(activity_id = %activity.id, "Activity logged");
        Ok(activity)
    }

    /// Replace an existing activity
    ///
    /// # Errors
    /// Returns error if validation fails or the activity does not exist
    pub async fn update(
        &self,
        auth: &AuthResult,
        activity_id: Uuid,
        payload: ActivityPayload,
    ) -> AppResult<Activity> {
        auth.require_active()?;
        let activity = Self::build_activity(auth.user_id, activity_id, payload)?;
        self.resources.database.update_activity(&activity).await
    }

    /// Rolling seven-day summary, delegating the grouping to SQL
    ///
    /// # Errors
    /// Returns error if the aggregation query fails
    pub async fn weekly_summary(&self, user_id: Uuid) -> AppResult<WeeklySummary> {
        let since = Utc::now() - Duration::days(7);
        let days = self
            .resources
            .database
            .get_daily_activity_totals(user_id, since)
            .await?;

        let mut summary = WeeklySummary {
            total_sessions: 0,
            total_duration_seconds: 0,
            total_distance_meters: 0.0,
            total_calories: 0.0,
            days,
        };
        for day in &summary.days {
            summary.total_sessions += day.sessions;
            summary.total_duration_seconds += day.duration_seconds;
            summary.total_distance_meters += day.distance_meters;
            summary.total_calories += day.calories;
        }

        Ok(summary)
    }

    /// Current and longest activity streaks
    ///
    /// # Errors
    /// Returns error if the activity-day query fails
    pub async fn streaks(&self, user_id: Uuid) -> AppResult<StreakSummary> {
        let days = self.resources.database.get_activity_days(user_id).await?;
        Ok(streaks::compute_streaks(&days, Utc::now().date_naive()))
    }
}

/// Activity routes (axum)
pub struct ActivityRoutes;

impl ActivityRoutes {
    /// Create all activity routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/activities",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/activities/summary/weekly",
                get(Self::handle_weekly_summary),
            )
            .route("/api/activities/streak", get(Self::handle_streak))
            .route(
                "/api/activities/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Log a new activity
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(payload): Json<ActivityPayload>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = ActivityService::new(resources);
        let activity = service.create(&auth, payload).await?;
        Ok((StatusCode::CREATED, Json(activity)).into_response())
    }

    /// List activities with filters and cursor pagination
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListActivitiesQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let sport = query
            .sport
            .map(|s| {
                s.parse::<SportType>()
                    .map_err(|e: String| AppError::invalid_input(e))
            })
            .transpose()?;

        let filter = ActivityFilter {
            sport,
            from: query.from,
            to: query.to,
        };
        let params = PaginationParams::new(query.cursor, query.limit);

        let page = resources
            .database
            .list_activities(auth.user_id, &filter, &params)
            .await?;

        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Get one activity
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(activity_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let activity = resources
            .database
            .get_activity(activity_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("activity {activity_id}")))?;

        Ok((StatusCode::OK, Json(activity)).into_response())
    }

    /// Replace one activity
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(activity_id): Path<Uuid>,
        Json(payload): Json<ActivityPayload>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = ActivityService::new(resources);
        let activity = service.update(&auth, activity_id, payload).await?;
        Ok((StatusCode::OK, Json(activity)).into_response())
    }

    /// Delete one activity
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(activity_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_active()?;

        resources
            .database
            .delete_activity(activity_id, auth.user_id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Rolling seven-day training summary
    async fn handle_weekly_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = ActivityService::new(resources);
        let summary = service.weekly_summary(auth.user_id).await?;
        Ok((StatusCode::OK, Json(summary)).into_response())
    }

    /// Current and longest streaks
    async fn handle_streak(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = ActivityService::new(resources);
        let streaks = service.streaks(auth.user_id).await?;
        Ok((StatusCode::OK, Json(streaks)).into_response())
    }
}
