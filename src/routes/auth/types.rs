// ABOUTME: Request and response types for authentication routes
// ABOUTME: Defines DTOs for registration, login, session, and profile management endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Authentication request and response types
//!
//! This module contains all DTOs (Data Transfer Objects) used by the
//! authentication routes for serialization and deserialization of API
//! requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User's email address
    pub email: String,
    /// User's password (will be hashed)
    pub password: String,
    /// Optional display name for the user
    pub display_name: Option<String>,
}

/// User registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Unique identifier for the newly created user
    pub user_id: String,
    /// Success message for the registration
    pub message: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User's email address
    pub email: String,
    /// User's password
    pub password: String,
}

/// User info for login and session responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// Unique identifier for the user
    pub user_id: String,
    /// User's email address
    pub email: String,
    /// User's display name if set
    pub display_name: Option<String>,
    /// User role for the permission system (`user`, `admin`)
    pub role: String,
    /// User account status (`pending`, `active`, `suspended`)
    pub user_status: String,
}

/// User login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// JWT authentication token (also set in the httpOnly cookie)
    pub jwt_token: String,
    /// When the token expires (ISO 8601 format)
    pub expires_at: String,
    /// User information
    pub user: UserInfo,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    /// Current JWT token to refresh
    pub token: String,
}

/// Session restore response for authenticated users
///
/// Returned by `GET /api/auth/session` so browser clients can restore
/// sessions from the httpOnly cookie on page refresh.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Authenticated user information
    pub user: UserInfo,
    /// Fresh JWT token
    pub access_token: String,
}

/// User profile update request
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name for the user
    pub display_name: Option<String>,
    /// New body weight in kilograms
    pub weight_kg: Option<f64>,
    /// New height in centimeters
    pub height_cm: Option<f64>,
    /// New date of birth (YYYY-MM-DD)
    pub date_of_birth: Option<NaiveDate>,
}

/// User profile update response
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    /// Success message
    pub message: String,
    /// Updated user information
    pub user: UserInfo,
}

/// Change password request for authenticated users
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password for verification
    pub current_password: String,
    /// New password to set
    pub new_password: String,
}

/// User stats response for dashboards
#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    /// Total logged activities
    pub total_activities: i64,
    /// Number of days the user has been registered
    pub days_registered: i64,
}
