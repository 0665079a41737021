// ABOUTME: Integration tests for authentication routes
// ABOUTME: Exercises registration, login, refresh, session restore, and profile flows over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::http::StatusCode;
use common::{create_test_resources, send_json};
use serde_json::json;
use stride_api::server::build_router;

#[tokio::test]
async fn test_register_login_and_session_flow() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    // Register
    let (status, body) = send_json(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "runner@example.com",
            "password": "str0ngpass",
            "display_name": "Runner",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user_id"].is_string());

    // Login
    let (status, body) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "runner@example.com",
            "password": "str0ngpass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["jwt_token"].as_str().expect("jwt in response").to_owned();
    assert_eq!(body["user"]["email"], "runner@example.com");
    assert_eq!(body["user"]["user_status"], "active");

    // Session restore with the bearer token
    let (status, body) = send_json(&router, "GET", "/api/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "runner@example.com");
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "victim@example.com",
            "password": "str0ngpass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Wrong password and unknown email produce the same response shape
    let (status, body) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "victim@example.com", "password": "wr0ngpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_pw_message = body["error"]["message"].clone();

    let (status, body) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "whatever1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], wrong_pw_message);
}

#[tokio::test]
async fn test_register_rejects_weak_passwords_and_bad_emails() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "str0ngpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "ok@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let payload = json!({ "email": "dup@example.com", "password": "str0ngpass" });
    let (status, _) = send_json(&router, "POST", "/api/auth/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(&router, "POST", "/api/auth/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_refresh_reissues_a_working_token() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let (_, _) = send_json(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "refresh@example.com", "password": "str0ngpass" })),
    )
    .await;
    let (_, body) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "refresh@example.com", "password": "str0ngpass" })),
    )
    .await;
    let token = body["jwt_token"].as_str().unwrap().to_owned();

    let (status, body) = send_json(
        &router,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["jwt_token"].as_str().unwrap().to_owned();

    let (status, _) = send_json(&router, "GET", "/api/auth/session", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::OK);

    // Garbage tokens are rejected
    let (status, _) = send_json(
        &router,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "token": "garbage" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let (_, _) = send_json(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "profile@example.com", "password": "str0ngpass" })),
    )
    .await;
    let (_, body) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "profile@example.com", "password": "str0ngpass" })),
    )
    .await;
    let token = body["jwt_token"].as_str().unwrap().to_owned();

    let (status, body) = send_json(
        &router,
        "PUT",
        "/api/user/profile",
        Some(&token),
        Some(json!({ "display_name": "Marathoner", "weight_kg": 70.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["display_name"], "Marathoner");

    // Change password, then the old one stops working
    let (status, _) = send_json(
        &router,
        "PUT",
        "/api/user/change-password",
        Some(&token),
        Some(json!({ "current_password": "str0ngpass", "new_password": "n3wpassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "profile@example.com", "password": "str0ngpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "profile@example.com", "password": "n3wpassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_credentials() {
    let (resources, _dir) = create_test_resources().await.expect("resources");
    let router = build_router(&resources);

    let (status, _) = send_json(&router, "GET", "/api/auth/session", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&router, "GET", "/api/user/stats", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
