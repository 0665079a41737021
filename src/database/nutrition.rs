// ABOUTME: Nutrition entry database operations
// ABOUTME: CRUD with ownership scoping and SQL-side daily macro totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{MealType, NutritionEntry};

/// Summed macros for one calendar day
#[derive(Debug, Clone, Serialize)]
pub struct DailyMacroTotals {
    /// UTC calendar day
    pub date: NaiveDate,
    /// Number of entries that day
    pub entries: i64,
    /// Total energy in kcal
    pub calories: f64,
    /// Total protein in grams
    pub protein_g: f64,
    /// Total carbohydrates in grams
    pub carbs_g: f64,
    /// Total fat in grams
    pub fat_g: f64,
}

const NUTRITION_COLUMNS: &str = r"
    id, user_id, logged_at, meal, description, calories,
    protein_g, carbs_g, fat_g, food_ref, created_at
";

impl Database {
    /// Create a new nutrition entry
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_nutrition_entry(&self, entry: &NutritionEntry) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO nutrition_entries (
                id, user_id, logged_at, meal, description, calories,
                protein_g, carbs_g, fat_g, food_ref, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .bind(entry.logged_at)
        .bind(entry.meal.as_str())
        .bind(&entry.description)
        .bind(entry.calories)
        .bind(entry.protein_g)
        .bind(entry.carbs_g)
        .bind(entry.fat_g)
        .bind(entry.food_ref)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create nutrition entry: {e}")))?;

        Ok(entry.id)
    }

    /// Get a nutrition entry by ID, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_nutrition_entry(
        &self,
        entry_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<NutritionEntry>> {
        let query = format!(
            "SELECT {NUTRITION_COLUMNS} FROM nutrition_entries WHERE id = $1 AND user_id = $2"
        );
        let row = sqlx::query(&query)
            .bind(entry_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get nutrition entry: {e}")))?;

        row.map(|r| Self::row_to_entry(&r)).transpose()
    }

    /// List a user's nutrition entries in a time range, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_nutrition_entries(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<NutritionEntry>> {
        let query = format!(
            r"
            SELECT {NUTRITION_COLUMNS} FROM nutrition_entries
            WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
            ORDER BY logged_at DESC
            "
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list nutrition entries: {e}")))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Update a nutrition entry, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not found or the update fails
    pub async fn update_nutrition_entry(&self, entry: &NutritionEntry) -> AppResult<NutritionEntry> {
        let result = sqlx::query(
            r"
            UPDATE nutrition_entries SET
                logged_at = $1,
                meal = $2,
                description = $3,
                calories = $4,
                protein_g = $5,
                carbs_g = $6,
                fat_g = $7,
                food_ref = $8
            WHERE id = $9 AND user_id = $10
            ",
        )
        .bind(entry.logged_at)
        .bind(entry.meal.as_str())
        .bind(&entry.description)
        .bind(entry.calories)
        .bind(entry.protein_g)
        .bind(entry.carbs_g)
        .bind(entry.fat_g)
        .bind(entry.food_ref)
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update nutrition entry: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("nutrition entry {}", entry.id)));
        }

        self.get_nutrition_entry(entry.id, entry.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("nutrition entry after update"))
    }

    /// Delete a nutrition entry, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not found or the delete fails
    pub async fn delete_nutrition_entry(&self, entry_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM nutrition_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete nutrition entry: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("nutrition entry {entry_id}")));
        }

        Ok(())
    }

    /// Per-day macro totals over a time range, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_daily_macro_totals(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<DailyMacroTotals>> {
        let rows = sqlx::query(
            r"
            SELECT date(logged_at) AS day,
                   COUNT(*) AS entries,
                   COALESCE(SUM(calories), 0.0) AS calories,
                   COALESCE(SUM(protein_g), 0.0) AS protein_g,
                   COALESCE(SUM(carbs_g), 0.0) AS carbs_g,
                   COALESCE(SUM(fat_g), 0.0) AS fat_g
            FROM nutrition_entries
            WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
            GROUP BY day
            ORDER BY day ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate nutrition: {e}")))?;

        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            let day: String = row.get("day");
            let date = day
                .parse()
                .map_err(|e| AppError::internal(format!("Invalid day bucket {day}: {e}")))?;
            totals.push(DailyMacroTotals {
                date,
                entries: row.get("entries"),
                calories: row.get("calories"),
                protein_g: row.get("protein_g"),
                carbs_g: row.get("carbs_g"),
                fat_g: row.get("fat_g"),
            });
        }

        Ok(totals)
    }

    /// Convert a database row to a `NutritionEntry`
    fn row_to_entry(row: &SqliteRow) -> AppResult<NutritionEntry> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let meal: String = row.get("meal");

        Ok(NutritionEntry {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Failed to parse entry id: {e}")))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Failed to parse entry owner: {e}")))?,
            logged_at: row.get("logged_at"),
            meal: meal
                .parse::<MealType>()
                .map_err(|e| AppError::internal(format!("Failed to parse meal type: {e}")))?,
            description: row.get("description"),
            calories: row.get("calories"),
            protein_g: row.get("protein_g"),
            carbs_g: row.get("carbs_g"),
            fat_g: row.get("fat_g"),
            food_ref: row.get("food_ref"),
            created_at: row.get("created_at"),
        })
    }
}
