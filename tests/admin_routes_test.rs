// ABOUTME: Integration tests for admin and analytics routes
// ABOUTME: Exercises user approval lifecycle, role enforcement, usage analytics, and the audit trail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::http::StatusCode;
use common::{
    create_test_admin, create_test_resources, create_test_resources_with, create_test_user,
    send_json, test_config,
};
use serde_json::json;
use stride_api::context::ServerResources;
use stride_api::models::User;
use stride_api::server::build_router;

/// Seed a user directly and mint a token
async fn seed(resources: &std::sync::Arc<ServerResources>, user: &User) -> String {
    resources
        .database
        .create_user(user)
        .await
        .expect("create user");
    resources
        .auth_manager
        .generate_token(user)
        .expect("generate token")
}

#[tokio::test]
async fn test_admin_endpoints_reject_non_admins() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let user = create_test_user("plain");
    let token = seed(&resources, &user).await;

    for uri in [
        "/api/admin/users",
        "/api/admin/audit/events",
        "/api/analytics/overview",
        "/api/analytics/usage/daily",
        "/api/analytics/endpoints/top",
    ] {
        let (status, _) = send_json(&router, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "expected 403 for {uri}");
    }
}

#[tokio::test]
async fn test_pending_user_approval_lifecycle() {
    // Approval flow only exists when auto-approval is off
    let mut config = test_config();
    config.auth.auto_approve_users = false;
    let (resources, _dir) = create_test_resources_with(config).await.expect("resources");
    let router = build_router(&resources);

    let admin = create_test_admin("boss");
    let admin_token = seed(&resources, &admin).await;

    // Self-registration lands in pending
    let (status, body) = send_json(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "newbie@example.com", "password": "str0ngpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["user_id"].as_str().unwrap().to_owned();

    let (status, body) = send_json(
        &router,
        "GET",
        "/api/admin/users?status=pending",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    // Pending users can authenticate but not log activities
    let (_, body) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "newbie@example.com", "password": "str0ngpass" })),
    )
    .await;
    let pending_token = body["jwt_token"].as_str().unwrap().to_owned();

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/activities",
        Some(&pending_token),
        Some(json!({
            "sport": "run",
            "title": "Too early",
            "started_at": chrono::Utc::now().to_rfc3339(),
            "duration_seconds": 600,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Approve, then logging works
    let (status, body) = send_json(
        &router,
        "POST",
        &format!("/api/admin/users/{user_id}/approve"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_status"], "active");

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/activities",
        Some(&pending_token),
        Some(json!({
            "sport": "run",
            "title": "First run",
            "started_at": chrono::Utc::now().to_rfc3339(),
            "duration_seconds": 600,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_suspension_locks_the_account_out() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let admin = create_test_admin("susp_admin");
    let admin_token = seed(&resources, &admin).await;

    let user = create_test_user("susp_user");
    let user_token = seed(&resources, &user).await;

    // Works before suspension
    let (status, _) = send_json(&router, "GET", "/api/auth/session", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &router,
        "POST",
        &format!("/api/admin/users/{}/suspend", user.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Existing tokens stop working immediately
    let (status, _) = send_json(&router, "GET", "/api/auth/session", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admins_cannot_suspend_or_delete_themselves() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let admin = create_test_admin("self_admin");
    let admin_token = seed(&resources, &admin).await;

    let (status, _) = send_json(
        &router,
        "POST",
        &format!("/api/admin/users/{}/suspend", admin.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &router,
        "DELETE",
        &format!("/api/admin/users/{}", admin.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_overview_reflects_recorded_usage() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let admin = create_test_admin("metrics");
    let admin_token = seed(&resources, &admin).await;

    let (status, body) = send_json(
        &router,
        "GET",
        "/api/analytics/overview?days=30",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["window_days"], 30);
    assert_eq!(body["total_users"], 1);
    assert!(body["total_requests"].is_number());
}

#[tokio::test]
async fn test_audit_trail_records_admin_actions() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let admin = create_test_admin("audit_admin");
    let admin_token = seed(&resources, &admin).await;

    let user = create_test_user("audit_user");
    let _ = seed(&resources, &user).await;

    let (status, _) = send_json(
        &router,
        "POST",
        &format!("/api/admin/users/{}/suspend", user.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &router,
        "GET",
        "/api/admin/audit/events",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let events = body["events"].as_array().unwrap();
    assert!(events
        .iter()
        .any(|e| e["event_type"] == "user_suspended"), "suspension should be audited");
}

#[tokio::test]
async fn test_user_usage_for_unknown_user_is_404() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let admin = create_test_admin("usage_admin");
    let admin_token = seed(&resources, &admin).await;

    let (status, _) = send_json(
        &router,
        "GET",
        &format!("/api/analytics/users/{}/usage", uuid::Uuid::new_v4()),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
