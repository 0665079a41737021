// ABOUTME: Usage analytics route handlers (admin only)
// ABOUTME: Platform overview, daily request buckets, endpoint rankings, and per-user usage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Usage analytics routes.
//!
//! All endpoints require the admin role. The heavy lifting (grouping,
//! summing, windowing) happens in the database layer's aggregation
//! queries; handlers just bound the window and shape the response.
//! Every access is written to the audit trail.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{context::ServerResources, errors::AppError};

/// Longest supported analytics window, in days
const MAX_WINDOW_DAYS: i64 = 365;

/// Query parameters bounding an analytics window
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    /// Trailing window length in days (default 30)
    pub days: Option<i64>,
}

/// Query parameters for the endpoint ranking
#[derive(Debug, Deserialize)]
pub struct TopEndpointsQuery {
    /// Trailing window length in days (default 30)
    pub days: Option<i64>,
    /// Number of endpoints to return (default 10, max 50)
    pub limit: Option<u32>,
}

/// Usage analytics routes (axum)
pub struct AnalyticsRoutes;

impl AnalyticsRoutes {
    /// Create all analytics routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analytics/overview", get(Self::handle_overview))
            .route("/api/analytics/usage/daily", get(Self::handle_daily_usage))
            .route(
                "/api/analytics/endpoints/top",
                get(Self::handle_top_endpoints),
            )
            .route(
                "/api/analytics/users/:user_id/usage",
                get(Self::handle_user_usage),
            )
            .with_state(resources)
    }

    /// Clamp a window query to a sane range
    fn window_days(days: Option<i64>) -> i64 {
        days.unwrap_or(30).clamp(1, MAX_WINDOW_DAYS)
    }

    /// Platform-wide usage overview
    async fn handle_overview(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let overview = resources
            .database
            .get_usage_overview(Self::window_days(query.days))
            .await?;

        resources
            .auditor
            .log_admin_access(auth.user_id, "analytics:overview")
            .await;

        Ok((StatusCode::OK, Json(overview)).into_response())
    }

    /// Per-day request buckets
    async fn handle_daily_usage(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let buckets = resources
            .database
            .get_daily_usage(Self::window_days(query.days), None)
            .await?;

        resources
            .auditor
            .log_admin_access(auth.user_id, "analytics:daily_usage")
            .await;

        Ok((StatusCode::OK, Json(buckets)).into_response())
    }

    /// Most-called endpoints
    async fn handle_top_endpoints(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<TopEndpointsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let limit = query.limit.unwrap_or(10).clamp(1, 50);
        let endpoints = resources
            .database
            .get_top_endpoints(Self::window_days(query.days), limit, None)
            .await?;

        resources
            .auditor
            .log_admin_access(auth.user_id, "analytics:top_endpoints")
            .await;

        Ok((StatusCode::OK, Json(endpoints)).into_response())
    }

    /// Usage summary for one user
    async fn handle_user_usage(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
        Query(query): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        // 404 for unknown users rather than an empty summary
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {user_id}")))?;

        let summary = resources
            .database
            .get_user_usage(user_id, Self::window_days(query.days))
            .await?;

        resources
            .auditor
            .log_admin_access(auth.user_id, &format!("analytics:user:{user_id}"))
            .await;

        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}
