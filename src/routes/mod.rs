// ABOUTME: Route module organization for Stride API HTTP endpoints
// ABOUTME: Centralized route definitions organized by domain with thin handlers delegating to services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Route modules.
//!
//! Each domain module exposes a `Routes` struct with a single
//! `routes(resources)` constructor returning an axum `Router`. Handlers
//! validate input, call the data-access layer, and shape JSON responses;
//! business rules live in service types next to the handlers.

/// Health check and system status routes
pub mod health;

/// Authentication and user account routes
pub mod auth;

/// Activity (workout session) logging routes
pub mod activities;

/// Nutrition logging and food search proxy routes
pub mod nutrition;

/// Workout plan and exercise catalog proxy routes
pub mod workouts;

/// Usage analytics routes (admin)
pub mod analytics;

/// Admin user management and audit trail routes
pub mod admin;

pub use activities::ActivityRoutes;
pub use admin::AdminRoutes;
pub use analytics::AnalyticsRoutes;
pub use auth::{
    AuthRoutes, AuthService, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    UserInfo,
};
pub use health::HealthRoutes;
pub use nutrition::NutritionRoutes;
pub use workouts::WorkoutRoutes;
