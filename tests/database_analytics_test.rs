// ABOUTME: Unit tests for analytics and audit database functionality
// ABOUTME: Validates usage recording, date-bucket aggregation, endpoint ranking, and the audit trail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::{create_test_database, create_test_user};
use stride_api::models::{ApiUsage, AuditEvent, AuditEventType, AuditSeverity};
use uuid::Uuid;

fn usage(user_id: Option<Uuid>, endpoint: &str, status: u16, hours_ago: i64) -> ApiUsage {
    ApiUsage {
        id: None,
        user_id,
        endpoint: endpoint.to_owned(),
        method: "GET".to_owned(),
        status_code: status,
        response_time_ms: Some(12),
        ip_address: Some("10.0.0.1".to_owned()),
        user_agent: Some("test-agent".to_owned()),
        timestamp: Utc::now() - Duration::hours(hours_ago),
    }
}

#[tokio::test]
async fn test_usage_overview_counts_requests_and_users() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("overview");
    db.create_user(&user).await.expect("create user");

    db.record_api_usage(&usage(Some(user.id), "/api/activities", 200, 1))
        .await
        .expect("record");
    db.record_api_usage(&usage(Some(user.id), "/api/activities", 200, 2))
        .await
        .expect("record");
    db.record_api_usage(&usage(None, "/api/auth/login", 401, 1))
        .await
        .expect("record");

    let overview = db.get_usage_overview(30).await.expect("overview");
    assert_eq!(overview.total_requests, 3);
    assert_eq!(overview.active_users, 1);
    assert_eq!(overview.total_users, 1);
    assert_eq!(overview.new_registrations, 1);
    assert_eq!(overview.window_days, 30);
}

#[tokio::test]
async fn test_daily_usage_buckets_count_errors() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    db.record_api_usage(&usage(None, "/api/auth/login", 200, 1))
        .await
        .expect("record");
    db.record_api_usage(&usage(None, "/api/auth/login", 500, 1))
        .await
        .expect("record");

    let buckets = db.get_daily_usage(7, None).await.expect("daily usage");
    let requests: i64 = buckets.iter().map(|b| b.requests).sum();
    let errors: i64 = buckets.iter().map(|b| b.errors).sum();
    assert_eq!(requests, 2);
    assert_eq!(errors, 1);
}

#[tokio::test]
async fn test_top_endpoints_rank_by_volume() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    for _ in 0..3 {
        db.record_api_usage(&usage(None, "/api/activities", 200, 1))
            .await
            .expect("record");
    }
    db.record_api_usage(&usage(None, "/api/nutrition", 200, 1))
        .await
        .expect("record");

    let top = db.get_top_endpoints(7, 10, None).await.expect("top");
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].endpoint, "/api/activities");
    assert_eq!(top[0].requests, 3);
    assert_eq!(top[1].endpoint, "/api/nutrition");
}

#[tokio::test]
async fn test_user_usage_is_scoped_to_the_user() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("user_usage");
    let other = create_test_user("other_usage");
    db.create_user(&user).await.expect("create user");
    db.create_user(&other).await.expect("create other");

    db.record_api_usage(&usage(Some(user.id), "/api/activities", 200, 1))
        .await
        .expect("record");
    db.record_api_usage(&usage(Some(other.id), "/api/nutrition", 200, 1))
        .await
        .expect("record");

    let summary = db.get_user_usage(user.id, 7).await.expect("summary");
    assert_eq!(summary.total_requests, 1);
    assert_eq!(summary.top_endpoints.len(), 1);
    assert_eq!(summary.top_endpoints[0].endpoint, "/api/activities");
}

#[tokio::test]
async fn test_old_usage_falls_out_of_the_window() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    db.record_api_usage(&usage(None, "/api/activities", 200, 24 * 40))
        .await
        .expect("record");

    let overview = db.get_usage_overview(30).await.expect("overview");
    assert_eq!(overview.total_requests, 0);
}

#[tokio::test]
async fn test_audit_events_round_trip() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user_id = Uuid::new_v4();
    let event = AuditEvent::new(
        AuditEventType::UserLogin,
        AuditSeverity::Info,
        "User successfully logged in".to_owned(),
        "authenticate".to_owned(),
        "success".to_owned(),
    )
    .with_user_id(user_id)
    .with_source_ip("10.0.0.1".to_owned())
    .with_resource(format!("user:{user_id}"))
    .with_metadata(serde_json::json!({ "client": "test" }));

    db.store_audit_event(&event).await.expect("store event");

    let events = db.get_recent_audit_events(10).await.expect("load events");
    assert_eq!(events.len(), 1);
    let loaded = &events[0];
    assert_eq!(loaded.event_id, event.event_id);
    assert_eq!(loaded.event_type, AuditEventType::UserLogin);
    assert_eq!(loaded.severity, AuditSeverity::Info);
    assert_eq!(loaded.user_id, Some(user_id));
    assert_eq!(loaded.metadata["client"], "test");
}

#[tokio::test]
async fn test_audit_event_limit_is_honored() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    for i in 0..5 {
        let event = AuditEvent::new(
            AuditEventType::UserLogout,
            AuditSeverity::Info,
            format!("logout {i}"),
            "authenticate".to_owned(),
            "success".to_owned(),
        );
        db.store_audit_event(&event).await.expect("store event");
    }

    let events = db.get_recent_audit_events(3).await.expect("load events");
    assert_eq!(events.len(), 3);
}
