// ABOUTME: Integration tests for activity routes
// ABOUTME: Exercises CRUD, validation, ownership, weekly summary, and streak endpoints over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{create_test_resources, create_test_user, send_json};
use serde_json::json;
use stride_api::server::build_router;

/// Seed a user directly and mint a token for them
async fn seeded_token(
    resources: &std::sync::Arc<stride_api::context::ServerResources>,
    prefix: &str,
) -> (uuid::Uuid, String) {
    let user = create_test_user(prefix);
    resources
        .database
        .create_user(&user)
        .await
        .expect("create user");
    let token = resources
        .auth_manager
        .generate_token(&user)
        .expect("generate token");
    (user.id, token)
}

fn activity_payload(days_ago: i64) -> serde_json::Value {
    json!({
        "sport": "run",
        "title": "Morning run",
        "started_at": (Utc::now() - Duration::days(days_ago)).to_rfc3339(),
        "duration_seconds": 1800,
        "distance_meters": 5000.0,
        "calories": 400.0,
        "average_heart_rate": 150,
    })
}

#[tokio::test]
async fn test_activity_crud_over_http() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);
    let (_, token) = seeded_token(&resources, "http_crud").await;

    // Create
    let (status, body) = send_json(
        &router,
        "POST",
        "/api/activities",
        Some(&token),
        Some(activity_payload(0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let activity_id = body["id"].as_str().expect("activity id").to_owned();
    assert_eq!(body["sport"], "run");

    // Read
    let (status, body) = send_json(
        &router,
        "GET",
        &format!("/api/activities/{activity_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Morning run");

    // Update
    let mut updated = activity_payload(0);
    updated["title"] = json!("Tempo run");
    let (status, body) = send_json(
        &router,
        "PUT",
        &format!("/api/activities/{activity_id}"),
        Some(&token),
        Some(updated),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Tempo run");

    // Delete
    let (status, _) = send_json(
        &router,
        "DELETE",
        &format!("/api/activities/{activity_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(
        &router,
        "GET",
        &format!("/api/activities/{activity_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);
    let (_, token) = seeded_token(&resources, "http_validation").await;

    let mut bad_sport = activity_payload(0);
    bad_sport["sport"] = json!("skydiving");
    let (status, _) = send_json(&router, "POST", "/api/activities", Some(&token), Some(bad_sport)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_duration = activity_payload(0);
    bad_duration["duration_seconds"] = json!(0);
    let (status, body) = send_json(
        &router,
        "POST",
        "/api/activities",
        Some(&token),
        Some(bad_duration),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_input");

    let mut bad_hr = activity_payload(0);
    bad_hr["average_heart_rate"] = json!(400);
    let (status, _) = send_json(&router, "POST", "/api/activities", Some(&token), Some(bad_hr)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cross_user_access_reads_as_not_found() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);
    let (_, owner_token) = seeded_token(&resources, "http_owner").await;
    let (_, other_token) = seeded_token(&resources, "http_other").await;

    let (_, body) = send_json(
        &router,
        "POST",
        "/api/activities",
        Some(&owner_token),
        Some(activity_payload(0)),
    )
    .await;
    let activity_id = body["id"].as_str().unwrap().to_owned();

    let (status, _) = send_json(
        &router,
        "GET",
        &format!("/api/activities/{activity_id}"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &router,
        "DELETE",
        &format!("/api/activities/{activity_id}"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_weekly_summary_and_streaks_over_http() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);
    let (_, token) = seeded_token(&resources, "http_summary").await;

    // Three consecutive days ending today
    for days_ago in 0..3 {
        let (status, _) = send_json(
            &router,
            "POST",
            "/api/activities",
            Some(&token),
            Some(activity_payload(days_ago)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_json(
        &router,
        "GET",
        "/api/activities/summary/weekly",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_sessions"], 3);
    assert_eq!(body["total_duration_seconds"], 3 * 1800);

    let (status, body) = send_json(&router, "GET", "/api/activities/streak", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_streak_days"], 3);
    assert_eq!(body["longest_streak_days"], 3);
    assert_eq!(body["total_active_days"], 3);
}

#[tokio::test]
async fn test_list_filters_and_paginates_over_http() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);
    let (_, token) = seeded_token(&resources, "http_list").await;

    for days_ago in 0..5 {
        let (status, _) = send_json(
            &router,
            "POST",
            "/api/activities",
            Some(&token),
            Some(activity_payload(days_ago)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_json(
        &router,
        "GET",
        "/api/activities?limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_more"], true);
    let cursor = body["next_cursor"].as_str().unwrap().to_owned();

    let (status, body) = send_json(
        &router,
        "GET",
        &format!("/api/activities?limit=10&cursor={cursor}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["has_more"], false);

    // Sport filter that matches nothing
    let (status, body) = send_json(
        &router,
        "GET",
        "/api/activities?sport=swim",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
}
