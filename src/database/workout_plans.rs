// ABOUTME: Workout plan database operations
// ABOUTME: CRUD with ownership scoping; exercise slots are stored as a JSON column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Difficulty, PlanSource, PlannedExercise, WorkoutPlan};

const PLAN_COLUMNS: &str = r"
    id, user_id, name, description, weeks, sessions_per_week,
    difficulty, source, exercises, created_at, updated_at
";

impl Database {
    /// Create a new workout plan
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails
    pub async fn create_workout_plan(&self, plan: &WorkoutPlan) -> AppResult<Uuid> {
        let exercises_json = serde_json::to_string(&plan.exercises)?;

        sqlx::query(
            r"
            INSERT INTO workout_plans (
                id, user_id, name, description, weeks, sessions_per_week,
                difficulty, source, exercises, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.user_id.to_string())
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(i64::from(plan.weeks))
        .bind(i64::from(plan.sessions_per_week))
        .bind(plan.difficulty.as_str())
        .bind(plan.source.as_str())
        .bind(exercises_json)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout plan: {e}")))?;

        Ok(plan.id)
    }

    /// Get a workout plan by ID, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_workout_plan(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<WorkoutPlan>> {
        let query =
            format!("SELECT {PLAN_COLUMNS} FROM workout_plans WHERE id = $1 AND user_id = $2");
        let row = sqlx::query(&query)
            .bind(plan_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get workout plan: {e}")))?;

        row.map(|r| Self::row_to_plan(&r)).transpose()
    }

    /// List a user's workout plans, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_workout_plans(&self, user_id: Uuid) -> AppResult<Vec<WorkoutPlan>> {
        let query = format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans WHERE user_id = $1 ORDER BY updated_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list workout plans: {e}")))?;

        rows.iter().map(Self::row_to_plan).collect()
    }

    /// Update a workout plan, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is not found or the update fails
    pub async fn update_workout_plan(&self, plan: &WorkoutPlan) -> AppResult<WorkoutPlan> {
        let exercises_json = serde_json::to_string(&plan.exercises)?;

        let result = sqlx::query(
            r"
            UPDATE workout_plans SET
                name = $1,
                description = $2,
                weeks = $3,
                sessions_per_week = $4,
                difficulty = $5,
                source = $6,
                exercises = $7,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $8 AND user_id = $9
            ",
        )
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(i64::from(plan.weeks))
        .bind(i64::from(plan.sessions_per_week))
        .bind(plan.difficulty.as_str())
        .bind(plan.source.as_str())
        .bind(exercises_json)
        .bind(plan.id.to_string())
        .bind(plan.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout plan: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("workout plan {}", plan.id)));
        }

        self.get_workout_plan(plan.id, plan.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("workout plan after update"))
    }

    /// Delete a workout plan, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is not found or the delete fails
    pub async fn delete_workout_plan(&self, plan_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout plan: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("workout plan {plan_id}")));
        }

        Ok(())
    }

    /// Convert a database row to a `WorkoutPlan`
    fn row_to_plan(row: &SqliteRow) -> AppResult<WorkoutPlan> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let difficulty: String = row.get("difficulty");
        let source: String = row.get("source");
        let exercises_json: String = row.get("exercises");

        let exercises: Vec<PlannedExercise> = serde_json::from_str(&exercises_json)
            .map_err(|e| AppError::internal(format!("Failed to parse plan exercises: {e}")))?;

        let weeks: i64 = row.get("weeks");
        let sessions_per_week: i64 = row.get("sessions_per_week");

        Ok(WorkoutPlan {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Failed to parse plan id: {e}")))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Failed to parse plan owner: {e}")))?,
            name: row.get("name"),
            description: row.get("description"),
            weeks: u32::try_from(weeks)
                .map_err(|e| AppError::internal(format!("Invalid weeks value: {e}")))?,
            sessions_per_week: u32::try_from(sessions_per_week)
                .map_err(|e| AppError::internal(format!("Invalid sessions value: {e}")))?,
            difficulty: difficulty
                .parse::<Difficulty>()
                .map_err(|e| AppError::internal(format!("Failed to parse difficulty: {e}")))?,
            source: PlanSource::from_str_lossy(&source),
            exercises,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
