// ABOUTME: HTTP server assembly and lifecycle
// ABOUTME: Builds the axum router with CORS, tracing, limits, and usage middleware, then serves with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Server assembly.
//!
//! All route groups merge into one router. The `/api` surface gets the
//! usage-recording/rate-limiting middleware; health probes stay outside
//! it so monitoring never counts against quotas or shows up in usage
//! analytics. Cross-cutting layers (CORS, tracing, timeout, body limit)
//! wrap the whole router.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::{middleware as axum_middleware, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::CorsConfig;
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::middleware::track_api_usage;
use crate::routes::{
    ActivityRoutes, AdminRoutes, AnalyticsRoutes, AuthRoutes, HealthRoutes, NutritionRoutes,
    WorkoutRoutes,
};

/// Build the complete application router
#[must_use]
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let api = Router::new()
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(ActivityRoutes::routes(resources.clone()))
        .merge(NutritionRoutes::routes(resources.clone()))
        .merge(WorkoutRoutes::routes(resources.clone()))
        .merge(AnalyticsRoutes::routes(resources.clone()))
        .merge(AdminRoutes::routes(resources.clone()))
        .layer(axum_middleware::from_fn_with_state(
            resources.clone(),
            track_api_usage,
        ));

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(api)
        .layer(cors_layer(&resources.config.cors))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            resources.config.http.request_timeout_secs,
        )))
        .layer(RequestBodyLimitLayer::new(
            resources.config.http.max_body_bytes,
        ))
}

/// Build the CORS layer from configured origins
///
/// With no configured origins the layer stays fully restrictive
/// (same-origin clients are unaffected; cross-origin browsers are
/// rejected by the missing headers).
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!("Ignoring unparseable CORS origin: {origin}"))
                .ok()
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_credentials(true)
}

/// Bind the listener and serve until shutdown
///
/// # Errors
///
/// Returns an error if binding or serving fails
pub async fn serve(resources: Arc<ServerResources>) -> AppResult<()> {
    let port = resources.config.http.port;
    let router = build_router(&resources);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind port {port}: {e}")))?;

    info!("Stride API listening on port {port}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Resolve when the process receives a termination signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install shutdown signal handler: {e}");
        // Fall through: without a signal handler we serve until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
