// ABOUTME: Unit tests for workout plan database functionality
// ABOUTME: Validates plan CRUD, JSON exercise round-trips, and ownership scoping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Utc;
use common::{create_test_database, create_test_user};
use stride_api::errors::ErrorCode;
use stride_api::models::{Difficulty, PlanSource, PlannedExercise, WorkoutPlan};
use uuid::Uuid;

fn plan(user_id: Uuid) -> WorkoutPlan {
    let now = Utc::now();
    WorkoutPlan {
        id: Uuid::new_v4(),
        user_id,
        name: "Base strength".to_owned(),
        description: Some("Three-day full body block".to_owned()),
        weeks: 8,
        sessions_per_week: 3,
        difficulty: Difficulty::Intermediate,
        source: PlanSource::Custom,
        exercises: vec![
            PlannedExercise {
                name: "Back squat".to_owned(),
                catalog_id: Some(101),
                sets: 5,
                reps: Some(5),
                duration_seconds: None,
                rest_seconds: Some(180),
            },
            PlannedExercise {
                name: "Plank".to_owned(),
                catalog_id: None,
                sets: 3,
                reps: None,
                duration_seconds: Some(60),
                rest_seconds: Some(60),
            },
        ],
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_plan_round_trips_exercises_through_json() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("plan_crud");
    db.create_user(&user).await.expect("create user");

    let stored = plan(user.id);
    db.create_workout_plan(&stored).await.expect("create plan");

    let loaded = db
        .get_workout_plan(stored.id, user.id)
        .await
        .expect("get plan")
        .expect("plan not found");

    assert_eq!(loaded.name, "Base strength");
    assert_eq!(loaded.difficulty, Difficulty::Intermediate);
    assert_eq!(loaded.exercises.len(), 2);
    assert_eq!(loaded.exercises[0].name, "Back squat");
    assert_eq!(loaded.exercises[0].reps, Some(5));
    assert_eq!(loaded.exercises[1].duration_seconds, Some(60));
}

#[tokio::test]
async fn test_plan_update_and_delete() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let user = create_test_user("plan_update");
    db.create_user(&user).await.expect("create user");

    let mut stored = plan(user.id);
    db.create_workout_plan(&stored).await.expect("create plan");

    stored.name = "Peak block".to_owned();
    stored.weeks = 4;
    stored.exercises.truncate(1);
    let updated = db.update_workout_plan(&stored).await.expect("update plan");
    assert_eq!(updated.name, "Peak block");
    assert_eq!(updated.weeks, 4);
    assert_eq!(updated.exercises.len(), 1);

    db.delete_workout_plan(stored.id, user.id)
        .await
        .expect("delete plan");
    assert!(db
        .get_workout_plan(stored.id, user.id)
        .await
        .expect("get plan")
        .is_none());
}

#[tokio::test]
async fn test_plans_are_ownership_scoped() {
    let db = create_test_database().await.expect("create test database");
    let db = &db.database;

    let owner = create_test_user("plan_owner");
    let other = create_test_user("plan_other");
    db.create_user(&owner).await.expect("create owner");
    db.create_user(&other).await.expect("create other");

    let stored = plan(owner.id);
    db.create_workout_plan(&stored).await.expect("create plan");

    assert!(db
        .get_workout_plan(stored.id, other.id)
        .await
        .expect("get plan")
        .is_none());

    let err = db
        .delete_workout_plan(stored.id, other.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let plans = db.list_workout_plans(owner.id).await.expect("list plans");
    assert_eq!(plans.len(), 1);
    let plans = db.list_workout_plans(other.id).await.expect("list plans");
    assert!(plans.is_empty());
}
