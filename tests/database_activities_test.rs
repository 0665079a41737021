// ABOUTME: Unit tests for activity database functionality
// ABOUTME: Validates CRUD, ownership scoping, cursor pagination, and aggregation queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::{create_test_activity, create_test_database, create_test_user};
use stride_api::database::ActivityFilter;
use stride_api::errors::ErrorCode;
use stride_api::models::SportType;
use stride_api::pagination::PaginationParams;

#[tokio::test]
async fn test_create_get_update_delete_activity() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("activity_crud");
    db.create_user(&user).await.expect("create user");

    let mut activity = create_test_activity(user.id, 0);
    db.create_activity(&activity).await.expect("create activity");

    let loaded = db
        .get_activity(activity.id, user.id)
        .await
        .expect("get activity")
        .expect("activity not found");
    assert_eq!(loaded.title, activity.title);
    assert_eq!(loaded.sport, SportType::Run);
    assert_eq!(loaded.duration_seconds, 1800);

    activity.title = "Evening run".to_owned();
    activity.distance_meters = Some(8000.0);
    let updated = db.update_activity(&activity).await.expect("update");
    assert_eq!(updated.title, "Evening run");
    assert_eq!(updated.distance_meters, Some(8000.0));

    db.delete_activity(activity.id, user.id)
        .await
        .expect("delete");
    assert!(db
        .get_activity(activity.id, user.id)
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn test_activities_are_ownership_scoped() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let owner = create_test_user("owner");
    let other = create_test_user("other");
    db.create_user(&owner).await.expect("create owner");
    db.create_user(&other).await.expect("create other");

    let activity = create_test_activity(owner.id, 0);
    db.create_activity(&activity).await.expect("create activity");

    // A foreign caller cannot see, update, or delete the row
    assert!(db
        .get_activity(activity.id, other.id)
        .await
        .expect("get")
        .is_none());

    let mut stolen = activity.clone();
    stolen.user_id = other.id;
    let err = db.update_activity(&stolen).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = db.delete_activity(activity.id, other.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_list_with_sport_filter() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("filter");
    db.create_user(&user).await.expect("create user");

    let mut run = create_test_activity(user.id, 1);
    run.sport = SportType::Run;
    let mut ride = create_test_activity(user.id, 2);
    ride.sport = SportType::Ride;
    db.create_activity(&run).await.expect("create run");
    db.create_activity(&ride).await.expect("create ride");

    let filter = ActivityFilter {
        sport: Some(SportType::Ride),
        ..ActivityFilter::default()
    };
    let page = db
        .list_activities(user.id, &filter, &PaginationParams::new(None, None))
        .await
        .expect("list");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, ride.id);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_cursor_pagination_walks_all_pages_without_duplicates() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("paging");
    db.create_user(&user).await.expect("create user");

    for days_ago in 0..7 {
        db.create_activity(&create_test_activity(user.id, days_ago))
            .await
            .expect("create activity");
    }

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let params = PaginationParams::new(cursor.clone(), Some(3));
        let page = db
            .list_activities(user.id, &ActivityFilter::default(), &params)
            .await
            .expect("list page");

        for item in &page.items {
            assert!(!seen.contains(&item.id), "duplicate item across pages");
            seen.push(item.id);
        }

        match page.next_cursor {
            Some(next) if page.has_more => cursor = Some(next.as_str().to_owned()),
            _ => break,
        }
    }

    assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn test_tampered_cursor_is_invalid_input() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("bad_cursor");
    db.create_user(&user).await.expect("create user");

    let params = PaginationParams::new(Some("!!!not-base64!!!".to_owned()), Some(3));
    let err = db
        .list_activities(user.id, &ActivityFilter::default(), &params)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_activity_days_are_distinct_and_descending() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("days");
    db.create_user(&user).await.expect("create user");

    // Two sessions today, one two days ago
    db.create_activity(&create_test_activity(user.id, 0))
        .await
        .expect("create");
    db.create_activity(&create_test_activity(user.id, 0))
        .await
        .expect("create");
    db.create_activity(&create_test_activity(user.id, 2))
        .await
        .expect("create");

    let days = db.get_activity_days(user.id).await.expect("days");
    assert_eq!(days.len(), 2);
    assert!(days[0] > days[1]);
}

#[tokio::test]
async fn test_daily_totals_group_and_sum_in_sql() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("totals");
    db.create_user(&user).await.expect("create user");

    db.create_activity(&create_test_activity(user.id, 1))
        .await
        .expect("create");
    db.create_activity(&create_test_activity(user.id, 1))
        .await
        .expect("create");

    let since = Utc::now() - Duration::days(7);
    let totals = db
        .get_daily_activity_totals(user.id, since)
        .await
        .expect("totals");

    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].sessions, 2);
    assert_eq!(totals[0].duration_seconds, 3600);
    assert!((totals[0].distance_meters - 10_000.0).abs() < f64::EPSILON);
    assert!((totals[0].calories - 800.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_totals_for_empty_history_are_empty() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("empty");
    db.create_user(&user).await.expect("create user");

    let since = Utc::now() - Duration::days(7);
    let totals = db
        .get_daily_activity_totals(user.id, since)
        .await
        .expect("totals");
    assert!(totals.is_empty());

    let days = db.get_activity_days(user.id).await.expect("days");
    assert!(days.is_empty());
}
