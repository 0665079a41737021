// ABOUTME: Workout plan route handlers and exercise catalog proxy
// ABOUTME: CRUD for structured plans plus proxied exercise search for plan building
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Workout plan routes.
//!
//! Plans are owned documents: a list of exercise slots plus schedule
//! metadata. The exercise search endpoint proxies the external catalog
//! so plan builders can pull exercises (with their catalog ids) without
//! talking to the upstream directly.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthResult,
    context::ServerResources,
    errors::{AppError, AppResult},
    models::{Difficulty, PlanSource, PlannedExercise, WorkoutPlan},
    validation,
};

/// Longest supported plan, in weeks
const MAX_PLAN_WEEKS: i64 = 52;
/// Most sessions per week a plan may schedule
const MAX_SESSIONS_PER_WEEK: i64 = 14;
/// Most exercise slots per plan
const MAX_PLAN_EXERCISES: usize = 50;

/// Create/replace payload for a workout plan
#[derive(Debug, Deserialize)]
pub struct WorkoutPlanPayload {
    /// Plan name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Plan length in weeks
    pub weeks: u32,
    /// Training sessions per week
    pub sessions_per_week: u32,
    /// Difficulty rating (`beginner`, `intermediate`, `advanced`)
    pub difficulty: String,
    /// Plan origin (`custom`, `catalog`); defaults to `custom`
    pub source: Option<String>,
    /// Ordered exercise slots
    pub exercises: Vec<PlannedExercise>,
}

/// Query parameters for exercise catalog search
#[derive(Debug, Deserialize)]
pub struct ExerciseSearchQuery {
    /// Free-text search term
    #[serde(default)]
    pub q: String,
    /// Muscle filter (upstream vocabulary)
    pub muscle: Option<String>,
    /// Equipment filter (upstream vocabulary)
    pub equipment: Option<String>,
    /// Page number, 1-indexed (default 1)
    pub page: Option<u32>,
}

/// Workout plan service for business logic
#[derive(Clone)]
pub struct WorkoutService {
    resources: Arc<ServerResources>,
}

impl WorkoutService {
    /// Creates a new workout service
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Validate a payload and build the stored plan
    fn build_plan(user_id: Uuid, id: Uuid, payload: WorkoutPlanPayload) -> AppResult<WorkoutPlan> {
        let difficulty: Difficulty = payload
            .difficulty
            .parse()
            .map_err(|e: String| AppError::invalid_input(e))?;
        let source = payload
            .source
            .as_deref()
            .map_or(PlanSource::Custom, PlanSource::from_str_lossy);

        validation::validate_text("name", &payload.name, validation::MAX_TITLE_LENGTH)?;
        validation::validate_optional_text(
            "description",
            payload.description.as_deref(),
            validation::MAX_TEXT_LENGTH,
        )?;
        validation::validate_range_i64("weeks", i64::from(payload.weeks), 1, MAX_PLAN_WEEKS)?;
        validation::validate_range_i64(
            "sessions_per_week",
            i64::from(payload.sessions_per_week),
            1,
            MAX_SESSIONS_PER_WEEK,
        )?;

        if payload.exercises.is_empty() {
            return Err(AppError::invalid_input(
                "A plan needs at least one exercise",
            ));
        }
        if payload.exercises.len() > MAX_PLAN_EXERCISES {
            return Err(AppError::invalid_input(format!(
                "A plan may hold at most {MAX_PLAN_EXERCISES} exercises"
            )));
        }

        let mut exercises = Vec::with_capacity(payload.exercises.len());
        for mut exercise in payload.exercises {
            validation::validate_text(
                "exercise name",
                &exercise.name,
                validation::MAX_TITLE_LENGTH,
            )?;
            validation::validate_range_i64("sets", i64::from(exercise.sets), 1, 20)?;
            if exercise.reps.is_none() && exercise.duration_seconds.is_none() {
                return Err(AppError::invalid_input(
                    "Each exercise needs reps or a duration",
                ));
            }
            exercise.name = validation::sanitize_text(&exercise.name);
            exercises.push(exercise);
        }

        let now = Utc::now();
        Ok(WorkoutPlan {
            id,
            user_id,
            name: validation::sanitize_text(&payload.name),
            description: validation::sanitize_optional_text(payload.description.as_deref()),
            weeks: payload.weeks,
            sessions_per_week: payload.sessions_per_week,
            difficulty,
            source,
            exercises,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a new plan
    ///
    /// # Errors
    /// Returns error if validation or the insert fails
    pub async fn create(
        &self,
        auth: &AuthResult,
        payload: WorkoutPlanPayload,
    ) -> AppResult<WorkoutPlan> {
        auth.require_active()?;
        let plan = Self::build_plan(auth.user_id, Uuid::new_v4(), payload)?;
        self.resources.database.create_workout_plan(&plan).await?;
        Ok(plan)
    }

    /// Replace an existing plan
    ///
    /// # Errors
    /// Returns error if validation fails or the plan does not exist
    pub async fn update(
        &self,
        auth: &AuthResult,
        plan_id: Uuid,
        payload: WorkoutPlanPayload,
    ) -> AppResult<WorkoutPlan> {
        auth.require_active()?;
        let plan = Self::build_plan(auth.user_id, plan_id, payload)?;
        self.resources.database.update_workout_plan(&plan).await
    }
}

/// Workout plan routes (axum)
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    /// Create all workout routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/workouts/plans",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/workouts/plans/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/workouts/exercises/search",
                get(Self::handle_exercise_search),
            )
            .with_state(resources)
    }

    /// Create a new plan
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(payload): Json<WorkoutPlanPayload>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = WorkoutService::new(resources);
        let plan = service.create(&auth, payload).await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    /// List the caller's plans
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let plans = resources.database.list_workout_plans(auth.user_id).await?;
        Ok((StatusCode::OK, Json(plans)).into_response())
    }

    /// Get one plan
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let plan = resources
            .database
            .get_workout_plan(plan_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("workout plan {plan_id}")))?;

        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Replace one plan
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
        Json(payload): Json<WorkoutPlanPayload>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let service = WorkoutService::new(resources);
        let plan = service.update(&auth, plan_id, payload).await?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Delete one plan
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_active()?;

        resources
            .database
            .delete_workout_plan(plan_id, auth.user_id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Proxy: exercise search against the catalog service
    async fn handle_exercise_search(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ExerciseSearchQuery>,
    ) -> Result<Response, AppError> {
        let _auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let page = resources
            .exercise_catalog
            .search_exercises(
                &query.q,
                query.muscle.as_deref(),
                query.equipment.as_deref(),
                query.page.unwrap_or(1),
            )
            .await?;

        Ok((StatusCode::OK, Json(page)).into_response())
    }
}
