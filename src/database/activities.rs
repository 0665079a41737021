// ABOUTME: Activity (workout session) database operations
// ABOUTME: CRUD with ownership scoping, cursor-paginated listing, and date-bucket aggregation queries
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
use crate::models::{Activity, SportType};
use crate::pagination::{Cursor, CursorPage, PaginationParams};

/// Optional filters for activity listings
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    /// Restrict to one sport
    pub sport: Option<SportType>,
    /// Only activities starting at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only activities starting before this instant
    pub to: Option<DateTime<Utc>>,
}

/// Aggregated totals for one calendar day of activity
#[derive(Debug, Clone, Serialize)]
pub struct DailyActivityTotals {
    /// UTC calendar day
    pub date: NaiveDate,
    /// Number of sessions that day
    pub sessions: i64,
    /// Total training time in seconds
    pub duration_seconds: i64,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Total energy expenditure in kcal
    pub calories: f64,
}

/// Rolling seven-day training summary
#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    /// Number of sessions in the window
    pub total_sessions: i64,
    /// Total training time in seconds
    pub total_duration_seconds: i64,
    /// Total distance in meters
    pub total_distance_meters: f64,
    /// Total energy expenditure in kcal
    pub total_calories: f64,
    /// Per-day buckets, oldest first; days without activity are omitted
    pub days: Vec<DailyActivityTotals>,
}

const ACTIVITY_COLUMNS: &str = r"
    id, user_id, sport, title, notes, started_at, duration_seconds,
    distance_meters, calories, average_heart_rate, max_heart_rate,
    perceived_exertion, created_at, updated_at
";

impl Database {
    /// Create a new activity
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_activity(&self, activity: &Activity) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO activities (
                id, user_id, sport, title, notes, started_at, duration_seconds,
                distance_meters, calories, average_heart_rate, max_heart_rate,
                perceived_exertion, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(activity.id.to_string())
        .bind(activity.user_id.to_string())
        .bind(activity.sport.as_str())
        .bind(&activity.title)
        .bind(&activity.notes)
        .bind(activity.started_at)
        .bind(activity.duration_seconds)
        .bind(activity.distance_meters)
        .bind(activity.calories)
        .bind(activity.average_heart_rate)
        .bind(activity.max_heart_rate)
        .bind(activity.perceived_exertion)
        .bind(activity.created_at)
        .bind(activity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create activity: {e}")))?;

        Ok(activity.id)
    }

    /// Get an activity by ID, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_activity(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Activity>> {
        let query =
            format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1 AND user_id = $2");
        let row = sqlx::query(&query)
            .bind(activity_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get activity: {e}")))?;

        row.map(|r| Self::row_to_activity(&r)).transpose()
    }

    /// List a user's activities with filters and keyset pagination
    ///
    /// Uses a `(started_at, id)` composite cursor so pages stay consistent
    /// while new activities are being logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is malformed or the query fails
    pub async fn list_activities(
        &self,
        user_id: Uuid,
        filter: &ActivityFilter,
        params: &PaginationParams,
    ) -> AppResult<CursorPage<Activity>> {
        // Fetch one extra row to determine whether more pages exist
        let fetch_limit = i64::try_from(params.limit + 1)
            .map_err(|_| AppError::invalid_input("Pagination limit too large"))?;

        let mut sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE user_id = $1"
        );

        let cursor_pos = match &params.cursor {
            Some(cursor) => Some(
                cursor
                    .decode()
                    .ok_or_else(|| AppError::invalid_input("Invalid cursor format"))?,
            ),
            None => None,
        };

        if filter.sport.is_some() {
            sql.push_str(" AND sport = $2");
        }
        if filter.from.is_some() {
            sql.push_str(" AND started_at >= $3");
        }
        if filter.to.is_some() {
            sql.push_str(" AND started_at < $4");
        }
        if cursor_pos.is_some() {
            sql.push_str(" AND (started_at < $5 OR (started_at = $5 AND id < $6))");
        }
        sql.push_str(" ORDER BY started_at DESC, id DESC LIMIT $7");

        // SQLite binds by position within the final statement, so renumber.
        let sql = renumber_placeholders(&sql);

        let mut query = sqlx::query(&sql).bind(user_id.to_string());
        if let Some(sport) = filter.sport {
            query = query.bind(sport.as_str());
        }
        if let Some(from) = filter.from {
            query = query.bind(from);
        }
        if let Some(to) = filter.to {
            query = query.bind(to);
        }
        // Numbered placeholders bind once per distinct index, in order of
        // first appearance; the repeated cursor timestamp reuses its slot.
        if let Some((ts, id)) = &cursor_pos {
            query = query.bind(*ts).bind(id.clone());
        }
        let rows = query
            .bind(fetch_limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list activities: {e}")))?;

        let mut activities: Vec<Activity> = rows
            .iter()
            .map(Self::row_to_activity)
            .collect::<AppResult<_>>()?;

        let has_more = activities.len() > params.limit;
        activities.truncate(params.limit);

        let next_cursor = if has_more {
            activities
                .last()
                .map(|a| Cursor::new(a.started_at, &a.id.to_string()))
        } else {
            None
        };

        Ok(CursorPage::new(activities, next_cursor, has_more))
    }

    /// Update an activity, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the activity is not found or the update fails
    pub async fn update_activity(&self, activity: &Activity) -> AppResult<Activity> {
        let result = sqlx::query(
            r"
            UPDATE activities SET
                sport = $1,
                title = $2,
                notes = $3,
                started_at = $4,
                duration_seconds = $5,
                distance_meters = $6,
                calories = $7,
                average_heart_rate = $8,
                max_heart_rate = $9,
                perceived_exertion = $10,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $11 AND user_id = $12
            ",
        )
        .bind(activity.sport.as_str())
        .bind(&activity.title)
        .bind(&activity.notes)
        .bind(activity.started_at)
        .bind(activity.duration_seconds)
        .bind(activity.distance_meters)
        .bind(activity.calories)
        .bind(activity.average_heart_rate)
        .bind(activity.max_heart_rate)
        .bind(activity.perceived_exertion)
        .bind(activity.id.to_string())
        .bind(activity.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update activity: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("activity {}", activity.id)));
        }

        self.get_activity(activity.id, activity.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("activity after update"))
    }

    /// Delete an activity, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the activity is not found or the delete fails
    pub async fn delete_activity(&self, activity_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1 AND user_id = $2")
            .bind(activity_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete activity: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("activity {activity_id}")));
        }

        Ok(())
    }

    /// Distinct UTC days on which the user logged an activity, newest first
    ///
    /// A day appears once no matter how many sessions it holds; this feeds
    /// the streak calculation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_activity_days(&self, user_id: Uuid) -> AppResult<Vec<NaiveDate>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r"
            SELECT DISTINCT date(started_at) AS day
            FROM activities
            WHERE user_id = $1
            ORDER BY day DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get activity days: {e}")))?;

        Ok(rows.iter().filter_map(|d| d.parse().ok()).collect())
    }

    /// Per-day activity totals since a given instant, oldest first
    ///
    /// The grouping and summing happen in SQL; callers only fold the
    /// buckets into window totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_daily_activity_totals(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<DailyActivityTotals>> {
        let rows = sqlx::query(
            r"
            SELECT date(started_at) AS day,
                   COUNT(*) AS sessions,
                   COALESCE(SUM(duration_seconds), 0) AS duration_seconds,
                   COALESCE(SUM(distance_meters), 0.0) AS distance_meters,
                   COALESCE(SUM(calories), 0.0) AS calories
            FROM activities
            WHERE user_id = $1 AND started_at >= $2
            GROUP BY day
            ORDER BY day ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate activities: {e}")))?;

        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            let day: String = row.get("day");
            let date = day
                .parse()
                .map_err(|e| AppError::internal(format!("Invalid day bucket {day}: {e}")))?;
            totals.push(DailyActivityTotals {
                date,
                sessions: row.get("sessions"),
                duration_seconds: row.get("duration_seconds"),
                distance_meters: row.get("distance_meters"),
                calories: row.get("calories"),
            });
        }

        Ok(totals)
    }

    /// Total number of logged activities for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_activity_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count activities: {e}")))?;
        Ok(count)
    }

    /// Convert a database row to an Activity struct
    fn row_to_activity(row: &SqliteRow) -> AppResult<Activity> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let sport: String = row.get("sport");

        Ok(Activity {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Failed to parse activity id: {e}")))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Failed to parse activity owner: {e}")))?,
            sport: sport
                .parse()
                .map_err(|e| AppError::internal(format!("Failed to parse sport: {e}")))?,
            title: row.get("title"),
            notes: row.get("notes"),
            started_at: row.get("started_at"),
            duration_seconds: row.get("duration_seconds"),
            distance_meters: row.get("distance_meters"),
            calories: row.get("calories"),
            average_heart_rate: row.get("average_heart_rate"),
            max_heart_rate: row.get("max_heart_rate"),
            perceived_exertion: row.get("perceived_exertion"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

/// Rewrite `$n` placeholders to consecutive positions after optional clauses
/// were skipped, keeping repeated positions (cursor timestamp) aligned.
fn renumber_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut mapping: Vec<(u32, u32)> = Vec::new();
    let mut next = 0u32;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut num = String::new();
        while let Some(d) = chars.peek().copied() {
            if d.is_ascii_digit() {
                num.push(d);
                chars.next();
            } else {
                break;
            }
        }
        let old: u32 = num.parse().unwrap_or(0);
        let new = if let Some(&(_, n)) = mapping.iter().find(|(o, _)| *o == old) {
            n
        } else {
            next += 1;
            mapping.push((old, next));
            next
        };
        out.push('$');
        out.push_str(&new.to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renumbering_closes_gaps_and_keeps_repeats() {
        let sql = "WHERE a = $1 AND b = $3 AND (c < $5 OR (c = $5 AND d < $6)) LIMIT $7";
        let renumbered = renumber_placeholders(sql);
        assert_eq!(
            renumbered,
            "WHERE a = $1 AND b = $2 AND (c < $3 OR (c = $3 AND d < $4)) LIMIT $5"
        );
    }

    #[test]
    fn renumbering_is_identity_for_dense_placeholders() {
        let sql = "INSERT INTO t VALUES ($1, $2, $3)";
        assert_eq!(renumber_placeholders(sql), sql);
    }
}
