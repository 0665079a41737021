// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, config, resource, and user creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs, dead_code)]

//! Shared test utilities for `stride_api`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests. Test databases live in per-test temp
//! directories so pooled connections always see the same schema.

use std::sync::{Arc, Once};

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use stride_api::{
    config::{
        AuthConfig, CorsConfig, ExternalServicesConfig, HttpConfig, ProxyServiceConfig,
        RateLimitConfig, ServerConfig,
    },
    context::ServerResources,
    database::Database,
    models::{Activity, SportType, User, UserRole, UserStatus},
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .try_init();
    });
}

/// A test database plus the temp directory keeping its file alive
pub struct TestDatabase {
    pub database: Database,
    _dir: TempDir,
}

/// Standard test database setup
pub async fn create_test_database() -> Result<TestDatabase> {
    init_test_logging();
    let dir = TempDir::new()?;
    let path = dir.path().join("stride-test.db");
    let url = format!("sqlite:{}", path.display());
    let database = Database::new(&url).await?;
    Ok(TestDatabase {
        database,
        _dir: dir,
    })
}

/// Server configuration suitable for tests
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http: HttpConfig {
            port: 0,
            request_timeout_secs: 5,
            max_body_bytes: 1024 * 1024,
        },
        database_url: "unused-in-tests".to_owned(),
        auth: AuthConfig {
            jwt_secret: "test-jwt-secret".to_owned(),
            jwt_expiry_hours: 24,
            refresh_grace_hours: 24,
            auto_approve_users: true,
        },
        cors: CorsConfig {
            allowed_origins: vec![],
        },
        rate_limit: RateLimitConfig {
            enabled: false,
            requests_per_window: 1000,
            window_secs: 60,
        },
        external: ExternalServicesConfig {
            food_data: test_proxy_config(),
            exercise_catalog: test_proxy_config(),
        },
    }
}

fn test_proxy_config() -> ProxyServiceConfig {
    ProxyServiceConfig {
        // Points nowhere; proxy tests never hit the network
        base_url: "http://127.0.0.1:9".to_owned(),
        api_key: String::new(),
        cache_ttl_secs: 60,
        rate_limit_per_minute: 30,
    }
}

/// Full server resources over a fresh test database.
///
/// Returns the temp dir guard alongside the resources; drop order keeps
/// the database file alive for the test's duration.
pub async fn create_test_resources() -> Result<(Arc<ServerResources>, TempDir)> {
    create_test_resources_with(test_config()).await
}

/// Server resources with a custom configuration
pub async fn create_test_resources_with(
    config: ServerConfig,
) -> Result<(Arc<ServerResources>, TempDir)> {
    init_test_logging();
    let dir = TempDir::new()?;
    let path = dir.path().join("stride-test.db");
    let url = format!("sqlite:{}", path.display());
    let database = Database::new(&url).await?;
    let resources = Arc::new(ServerResources::new(config, database));
    Ok((resources, dir))
}

/// Build an active user with a unique email
pub fn create_test_user(email_prefix: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: format!("{email_prefix}_{}@example.com", Uuid::new_v4().simple()),
        display_name: Some("Test User".to_owned()),
        password_hash: "hashed_password".to_owned(),
        role: UserRole::User,
        user_status: UserStatus::Active,
        is_active: true,
        approved_by: None,
        approved_at: Some(now),
        weight_kg: None,
        height_cm: None,
        date_of_birth: None,
        created_at: now,
        last_active: now,
    }
}

/// Build an admin user with a unique email
pub fn create_test_admin(email_prefix: &str) -> User {
    let mut user = create_test_user(email_prefix);
    user.role = UserRole::Admin;
    user
}

/// Send one JSON request through the router, returning status and body
pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = if let Some(body) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, value)
}

/// Build an activity for a user, started `days_ago` days in the past
pub fn create_test_activity(user_id: Uuid, days_ago: i64) -> Activity {
    let now = Utc::now();
    Activity {
        id: Uuid::new_v4(),
        user_id,
        sport: SportType::Run,
        title: "Morning run".to_owned(),
        notes: None,
        started_at: now - Duration::days(days_ago),
        duration_seconds: 1800,
        distance_meters: Some(5000.0),
        calories: Some(400.0),
        average_heart_rate: Some(150),
        max_heart_rate: Some(175),
        perceived_exertion: Some(6),
        created_at: now,
        updated_at: now,
    }
}
