// ABOUTME: Health check route handlers
// ABOUTME: Liveness and readiness endpoints backed by the HealthChecker probes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::context::ServerResources;
use crate::health::HealthStatus;

/// Health check routes
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_liveness))
            .route("/health/ready", get(Self::handle_readiness))
            .with_state(resources)
    }

    /// Liveness probe: answers whenever the process is up
    async fn handle_liveness(State(resources): State<Arc<ServerResources>>) -> Response {
        Json(json!({
            "status": "ok",
            "uptime_secs": resources.health.uptime_secs(),
        }))
        .into_response()
    }

    /// Readiness probe: includes database connectivity and latency
    async fn handle_readiness(State(resources): State<Arc<ServerResources>>) -> Response {
        let report = resources.health.readiness().await;
        let status = match report.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(report)).into_response()
    }
}
