// ABOUTME: HTTP middleware for usage recording and rate limiting
// ABOUTME: Records every API request into the analytics table and enforces per-user request quotas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Request-path middleware.
//!
//! [`track_api_usage`] wraps the `/api` router: it times the handler,
//! resolves the caller from the bearer token or cookie (claims only, no
//! database hit), enforces the per-user rate limit, and records an
//! [`ApiUsage`] row after the response. Recording is best-effort and
//! detached from the request so a slow insert never delays a response.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tokio::time::Instant;
use tracing::error;
use uuid::Uuid;

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::ApiUsage;
use crate::rate_limiting::RateLimitStatus;
use crate::security::cookies::get_cookie_value;

/// Record usage and enforce rate limits for API routes
pub async fn track_api_usage(
    State(resources): State<Arc<ServerResources>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();

    // Prefer the matched route template over the raw path so
    // /api/activities/<uuid> buckets as one endpoint.
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_owned(), |p| p.as_str().to_owned());

    let ip_address = client_ip(request.headers());
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    // Claims-only identification; full authentication happens in handlers.
    let user_id = identify_caller(&resources, request.headers());

    // Enforce the per-user quota before doing any work
    let mut limit_status: Option<RateLimitStatus> = None;
    if let Some(uid) = user_id {
        let status = resources.rate_limiter.check(uid);
        if status.is_rate_limited {
            let retry_after = status.retry_after_secs();
            let mut response =
                AppError::rate_limit("Request quota exceeded", retry_after).into_response();
            attach_rate_limit_headers(response.headers_mut(), &status);
            record_usage(
                &resources,
                user_id,
                endpoint,
                method,
                response.status().as_u16(),
                started,
                ip_address,
                user_agent,
            );
            return response;
        }
        limit_status = Some(status);
    }

    let mut response = next.run(request).await;

    if let Some(status) = &limit_status {
        attach_rate_limit_headers(response.headers_mut(), status);
    }

    record_usage(
        &resources,
        user_id,
        endpoint,
        method,
        response.status().as_u16(),
        started,
        ip_address,
        user_agent,
    );

    response
}

/// Resolve the caller's user id from bearer token or cookie claims
fn identify_caller(resources: &Arc<ServerResources>, headers: &HeaderMap) -> Option<Uuid> {
    let token = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned)
        .or_else(|| get_cookie_value(headers, "auth_token"))?;

    let claims = resources.auth_manager.validate_token(&token).ok()?;
    Uuid::parse_str(&claims.sub).ok()
}

/// Best-effort client IP from proxy headers
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        })
}

/// Attach X-RateLimit-* headers to a response
fn attach_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    let pairs = [
        ("x-ratelimit-limit", status.limit.to_string()),
        ("x-ratelimit-remaining", status.remaining.to_string()),
        ("x-ratelimit-reset", status.reset_at.timestamp().to_string()),
    ];
    for (name, value) in pairs {
        if let Ok(v) = HeaderValue::from_str(&value) {
            headers.insert(name, v);
        }
    }
}

/// Spawn a detached insert of the usage row; failures are logged, never surfaced
#[allow(clippy::too_many_arguments)]
fn record_usage(
    resources: &Arc<ServerResources>,
    user_id: Option<Uuid>,
    endpoint: String,
    method: String,
    status_code: u16,
    started: Instant,
    ip_address: Option<String>,
    user_agent: Option<String>,
) {
    let elapsed_ms = u32::try_from(started.elapsed().as_millis()).ok();
    let database = resources.database.clone();

    let usage = ApiUsage {
        id: None,
        user_id,
        endpoint,
        method,
        status_code,
        response_time_ms: elapsed_ms,
        ip_address,
        user_agent,
        timestamp: Utc::now(),
    };

    tokio::spawn(async move {
        if let Err(e) = database.record_api_usage(&usage).await {
            error!("Failed to record API usage: {e}");
        }
    });
}
