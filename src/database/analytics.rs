// ABOUTME: Usage analytics database operations
// ABOUTME: Records per-request usage rows and aggregates them into date buckets and endpoint rankings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::ApiUsage;

/// Requests aggregated into one calendar day
#[derive(Debug, Clone, Serialize)]
pub struct DailyUsageBucket {
    /// UTC calendar day
    pub date: NaiveDate,
    /// Total requests that day
    pub requests: i64,
    /// Requests that returned a 4xx/5xx status
    pub errors: i64,
    /// Mean handler latency in milliseconds
    pub avg_response_time_ms: f64,
}

/// Request count for one endpoint/method pair
#[derive(Debug, Clone, Serialize)]
pub struct EndpointCount {
    /// Normalized route path
    pub endpoint: String,
    /// HTTP method
    pub method: String,
    /// Requests in the window
    pub requests: i64,
}

/// Platform-wide usage overview
#[derive(Debug, Clone, Serialize)]
pub struct UsageOverview {
    /// Window length in days
    pub window_days: i64,
    /// Total requests in the window
    pub total_requests: i64,
    /// Distinct authenticated users seen in the window
    pub active_users: i64,
    /// Accounts registered in the window
    pub new_registrations: i64,
    /// Total registered accounts
    pub total_users: i64,
}

/// Usage summary for a single user
#[derive(Debug, Clone, Serialize)]
pub struct UserUsageSummary {
    /// Total requests in the window
    pub total_requests: i64,
    /// Per-day buckets, oldest first
    pub daily: Vec<DailyUsageBucket>,
    /// Most-called endpoints
    pub top_endpoints: Vec<EndpointCount>,
}

impl Database {
    /// Record one API request
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails. Callers on the request path
    /// log and swallow this error; recording must never fail a request.
    pub async fn record_api_usage(&self, usage: &ApiUsage) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO api_usage (
                user_id, endpoint, method, status_code, response_time_ms,
                ip_address, user_agent, timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(usage.user_id.map(|id| id.to_string()))
        .bind(&usage.endpoint)
        .bind(&usage.method)
        .bind(i64::from(usage.status_code))
        .bind(usage.response_time_ms.map(i64::from))
        .bind(&usage.ip_address)
        .bind(&usage.user_agent)
        .bind(usage.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record API usage: {e}")))?;

        Ok(())
    }

    /// Platform-wide usage overview for the trailing window
    ///
    /// # Errors
    ///
    /// Returns an error if any aggregate query fails
    pub async fn get_usage_overview(&self, window_days: i64) -> AppResult<UsageOverview> {
        let since = Utc::now() - Duration::days(window_days);

        let total_requests: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM api_usage WHERE timestamp >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to count requests: {e}")))?;

        let active_users: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM api_usage WHERE timestamp >= $1 AND user_id IS NOT NULL",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count active users: {e}")))?;

        let new_registrations: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to count registrations: {e}")))?;

        let total_users = self.get_user_count().await?;

        Ok(UsageOverview {
            window_days,
            total_requests,
            active_users,
            new_registrations,
            total_users,
        })
    }

    /// Per-day request buckets for the trailing window, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregate query fails
    pub async fn get_daily_usage(
        &self,
        window_days: i64,
        user_id: Option<Uuid>,
    ) -> AppResult<Vec<DailyUsageBucket>> {
        let since = Utc::now() - Duration::days(window_days);

        let base = r"
            SELECT date(timestamp) AS day,
                   COUNT(*) AS requests,
                   COALESCE(SUM(CASE WHEN status_code >= 400 THEN 1 ELSE 0 END), 0) AS errors,
                   COALESCE(AVG(response_time_ms), 0.0) AS avg_response_time_ms
            FROM api_usage
            WHERE timestamp >= $1
        ";
        let sql = if user_id.is_some() {
            format!("{base} AND user_id = $2 GROUP BY day ORDER BY day ASC")
        } else {
            format!("{base} GROUP BY day ORDER BY day ASC")
        };

        let mut query = sqlx::query(&sql).bind(since);
        if let Some(uid) = user_id {
            query = query.bind(uid.to_string());
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to aggregate daily usage: {e}")))?;

        let mut buckets = Vec::with_capacity(rows.len());
        for row in rows {
            let day: String = row.get("day");
            let date = day
                .parse()
                .map_err(|e| AppError::internal(format!("Invalid day bucket {day}: {e}")))?;
            buckets.push(DailyUsageBucket {
                date,
                requests: row.get("requests"),
                errors: row.get("errors"),
                avg_response_time_ms: row.get("avg_response_time_ms"),
            });
        }

        Ok(buckets)
    }

    /// Most-called endpoints in the trailing window
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregate query fails
    pub async fn get_top_endpoints(
        &self,
        window_days: i64,
        limit: u32,
        user_id: Option<Uuid>,
    ) -> AppResult<Vec<EndpointCount>> {
        let since = Utc::now() - Duration::days(window_days);

        let base = r"
            SELECT endpoint, method, COUNT(*) AS requests
            FROM api_usage
            WHERE timestamp >= $1
        ";
        let sql = if user_id.is_some() {
            format!("{base} AND user_id = $2 GROUP BY endpoint, method ORDER BY requests DESC LIMIT $3")
        } else {
            format!("{base} GROUP BY endpoint, method ORDER BY requests DESC LIMIT $2")
        };

        let mut query = sqlx::query(&sql).bind(since);
        if let Some(uid) = user_id {
            query = query.bind(uid.to_string());
        }
        let rows = query
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to rank endpoints: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| EndpointCount {
                endpoint: row.get("endpoint"),
                method: row.get("method"),
                requests: row.get("requests"),
            })
            .collect())
    }

    /// Usage summary for one user over the trailing window
    ///
    /// # Errors
    ///
    /// Returns an error if any aggregate query fails
    pub async fn get_user_usage(
        &self,
        user_id: Uuid,
        window_days: i64,
    ) -> AppResult<UserUsageSummary> {
        let daily = self.get_daily_usage(window_days, Some(user_id)).await?;
        let top_endpoints = self.get_top_endpoints(window_days, 10, Some(user_id)).await?;
        let total_requests = daily.iter().map(|b| b.requests).sum();

        Ok(UserUsageSummary {
            total_requests,
            daily,
            top_endpoints,
        })
    }
}
