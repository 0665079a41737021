// ABOUTME: User authentication route handlers for registration, login, and session management
// ABOUTME: Provides REST endpoints for account lifecycle, profiles, and password changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Authentication routes for user management.
//!
//! This module handles registration, login, token refresh, session
//! restore, and profile management. All handlers are thin wrappers that
//! delegate business logic to [`AuthService`].
//!
//! ## Module Structure
//! - `types` - Request/response DTOs for auth endpoints

mod types;

pub use types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest, RegisterRequest,
    RegisterResponse, SessionResponse, UpdateProfileRequest, UpdateProfileResponse, UserInfo,
    UserStatsResponse,
};

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde_json::json;
use tokio::task;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    context::ServerResources,
    database::users::ProfileUpdate,
    errors::{AppError, AppResult},
    models::{AuditEventType, User, UserStatus},
    security::cookies::{clear_auth_cookie, set_auth_cookie},
    validation,
};

/// Authentication service for business logic
#[derive(Clone)]
pub struct AuthService {
    resources: Arc<ServerResources>,
}

impl AuthService {
    /// Creates a new authentication service
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Handle user registration
    ///
    /// # Errors
    /// Returns error if validation fails, the email is taken, or the
    /// database operation fails
    #[tracing::instrument(skip(self, request), fields(route = "register"))]
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        info!("User registration attempt");

        validation::validate_email(&request.email)?;
        validation::validate_password(&request.password)?;

        if let Ok(Some(_)) = self
            .resources
            .database
            .get_user_by_email(&request.email)
            .await
        {
            return Err(AppError::conflict("A user with this email already exists"));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let display_name = validation::sanitize_optional_text(request.display_name.as_deref());
        let mut user = User::new(request.email.clone(), password_hash, display_name);

        if self.resources.config.auth.auto_approve_users {
            user.user_status = UserStatus::Active;
            user.approved_at = Some(Utc::now());
            info!("Auto-approving user registration (auto_approve_users=true)");
        }

        let user_id = self
            .resources
            .database
            .create_user(&user)
            .await
            .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        info!(user_id = %user_id, "User registered successfully");

        let message = if user.user_status == UserStatus::Active {
            "User registered successfully. Your account is ready to use.".to_owned()
        } else {
            "User registered successfully. Your account is pending admin approval.".to_owned()
        };

        Ok(RegisterResponse {
            user_id: user_id.to_string(),
            message,
        })
    }

    /// Handle user login
    ///
    /// # Errors
    /// Returns error if authentication fails or token generation fails
    #[tracing::instrument(skip(self, request), fields(route = "login"))]
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        debug!("User login attempt");

        // Unknown email and wrong password return the same message
        let user = self
            .resources
            .database
            .get_user_by_email_required(&request.email)
            .await
            .map_err(|e| {
                debug!(email = %request.email, error = %e, "Login failed: user lookup error");
                AppError::auth_invalid("Invalid email or password")
            })?;

        // Verify password off the async executor
        let password = request.password.clone();
        let password_hash = user.password_hash.clone();
        let is_valid = task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|_| AppError::auth_invalid("Invalid email or password"))?;

        if !is_valid {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        if !user.user_status.can_login() {
            info!(user_id = %user.id, status = %user.user_status, "Login rejected for suspended account");
            return Err(AppError::auth_invalid("Account is suspended"));
        }

        self.resources
            .database
            .update_last_active(user.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;

        let jwt_token = self.resources.auth_manager.generate_token(&user)?;
        let expires_at = Utc::now() + Duration::seconds(self.resources.auth_manager.expiry_seconds());

        info!(user_id = %user.id, "User logged in successfully");

        Ok(LoginResponse {
            jwt_token,
            expires_at: expires_at.to_rfc3339(),
            user: Self::user_info(&user),
        })
    }

    /// Refresh a session token within the grace window
    ///
    /// # Errors
    /// Returns error if the token is invalid, too old, or the account can
    /// no longer log in
    #[tracing::instrument(skip(self, request), fields(route = "refresh"))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> AppResult<LoginResponse> {
        let claims = self
            .resources
            .auth_manager
            .validate_for_refresh(&request.token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Malformed token subject"))?;

        let user = self
            .resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Unknown user"))?;

        if !user.user_status.can_login() {
            return Err(AppError::auth_invalid("Account is suspended"));
        }

        let jwt_token = self.resources.auth_manager.generate_token(&user)?;
        let expires_at = Utc::now() + Duration::seconds(self.resources.auth_manager.expiry_seconds());

        debug!(user_id = %user.id, "Session token refreshed");

        Ok(LoginResponse {
            jwt_token,
            expires_at: expires_at.to_rfc3339(),
            user: Self::user_info(&user),
        })
    }

    /// Update profile fields for the authenticated user
    ///
    /// # Errors
    /// Returns error if validation fails or the update fails
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<UpdateProfileResponse> {
        validation::validate_optional_text(
            "display_name",
            request.display_name.as_deref(),
            validation::MAX_TITLE_LENGTH,
        )?;
        validation::validate_optional_f64("weight_kg", request.weight_kg, 500.0)?;
        validation::validate_optional_f64("height_cm", request.height_cm, 300.0)?;

        let update = ProfileUpdate {
            display_name: validation::sanitize_optional_text(request.display_name.as_deref()),
            weight_kg: request.weight_kg,
            height_cm: request.height_cm,
            date_of_birth: request.date_of_birth,
        };

        let user = self
            .resources
            .database
            .update_user_profile(user_id, &update)
            .await?;

        Ok(UpdateProfileResponse {
            message: "Profile updated".to_owned(),
            user: Self::user_info(&user),
        })
    }

    /// Change the authenticated user's password
    ///
    /// # Errors
    /// Returns error if the current password is wrong or the new password
    /// fails validation
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = self
            .resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {user_id}")))?;

        let current = request.current_password.clone();
        let password_hash = user.password_hash.clone();
        let is_valid = task::spawn_blocking(move || bcrypt::verify(&current, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|_| AppError::auth_invalid("Current password is incorrect"))?;

        if !is_valid {
            return Err(AppError::auth_invalid("Current password is incorrect"));
        }

        validation::validate_password(&request.new_password)?;

        let new_hash = bcrypt::hash(&request.new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        self.resources
            .database
            .update_user_password(user_id, &new_hash)
            .await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Dashboard stats for the authenticated user
    ///
    /// # Errors
    /// Returns error if the database queries fail
    pub async fn user_stats(&self, user_id: Uuid) -> AppResult<UserStatsResponse> {
        let user = self
            .resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {user_id}")))?;

        let total_activities = self.resources.database.get_activity_count(user_id).await?;
        let days_registered = (Utc::now() - user.created_at).num_days().max(0);

        Ok(UserStatsResponse {
            total_activities,
            days_registered,
        })
    }

    /// Shape a user into the response DTO
    fn user_info(user: &User) -> UserInfo {
        UserInfo {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.as_str().to_owned(),
            user_status: user.user_status.to_string(),
        }
    }
}

/// Authentication routes (axum)
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/refresh", post(Self::handle_refresh))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/session", get(Self::handle_session))
            .route("/api/user/profile", put(Self::handle_update_profile))
            .route(
                "/api/user/change-password",
                put(Self::handle_change_password),
            )
            .route("/api/user/stats", get(Self::handle_user_stats))
            .with_state(resources)
    }

    /// Handle user self-registration
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let service = AuthService::new(resources.clone());

        match service.register(request).await {
            Ok(response) => {
                if let Ok(user_id) = Uuid::parse_str(&response.user_id) {
                    resources
                        .auditor
                        .log_account_event(
                            AuditEventType::UserRegistered,
                            user_id,
                            None,
                            client_ip(&headers),
                        )
                        .await;
                }
                Ok((StatusCode::CREATED, Json(response)).into_response())
            }
            Err(e) => {
                error!("Registration failed: {e}");
                Err(e)
            }
        }
    }

    /// Handle user login; sets the httpOnly auth cookie on success
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let service = AuthService::new(resources.clone());
        let source_ip = client_ip(&headers);
        let user_agent = user_agent(&headers);

        match service.login(request).await {
            Ok(response) => {
                let user_id = Uuid::parse_str(&response.user.user_id).ok();
                resources
                    .auditor
                    .log_authentication_event(
                        AuditEventType::UserLogin,
                        user_id,
                        source_ip,
                        user_agent,
                        true,
                    )
                    .await;

                let mut response_headers = HeaderMap::new();
                set_auth_cookie(
                    &mut response_headers,
                    &response.jwt_token,
                    resources.auth_manager.expiry_seconds(),
                );

                Ok((StatusCode::OK, response_headers, Json(response)).into_response())
            }
            Err(e) => {
                resources
                    .auditor
                    .log_authentication_event(
                        AuditEventType::UserLogin,
                        None,
                        source_ip,
                        user_agent,
                        false,
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Handle token refresh; re-sets the auth cookie
    async fn handle_refresh(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<RefreshTokenRequest>,
    ) -> Result<Response, AppError> {
        let service = AuthService::new(resources.clone());
        let response = service.refresh(request).await?;

        let user_id = Uuid::parse_str(&response.user.user_id).ok();
        resources
            .auditor
            .log_authentication_event(
                AuditEventType::TokenRefreshed,
                user_id,
                client_ip(&headers),
                user_agent(&headers),
                true,
            )
            .await;

        let mut response_headers = HeaderMap::new();
        set_auth_cookie(
            &mut response_headers,
            &response.jwt_token,
            resources.auth_manager.expiry_seconds(),
        );

        Ok((StatusCode::OK, response_headers, Json(response)).into_response())
    }

    /// Handle logout: clears the auth cookie
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        // Best-effort identification for the audit trail; logout always succeeds
        if let Ok(auth) = resources.auth_middleware.authenticate_request(&headers).await {
            resources
                .auditor
                .log_authentication_event(
                    AuditEventType::UserLogout,
                    Some(auth.user_id),
                    client_ip(&headers),
                    user_agent(&headers),
                    true,
                )
                .await;
        }

        let mut response_headers = HeaderMap::new();
        clear_auth_cookie(&mut response_headers);

        Ok((
            StatusCode::OK,
            response_headers,
            Json(json!({ "message": "Logged out successfully" })),
        )
            .into_response())
    }

    /// Restore a session from the httpOnly cookie (or bearer token)
    async fn handle_session(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let user = resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {}", auth.user_id)))?;

        let access_token = resources.auth_manager.generate_token(&user)?;

        let mut response_headers = HeaderMap::new();
        set_auth_cookie(
            &mut response_headers,
            &access_token,
            resources.auth_manager.expiry_seconds(),
        );

        let response = SessionResponse {
            user: AuthService::user_info(&user),
            access_token,
        };

        Ok((StatusCode::OK, response_headers, Json(response)).into_response())
    }

    /// Update the authenticated user's profile
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let service = AuthService::new(resources.clone());
        let response = service.update_profile(auth.user_id, request).await?;

        resources
            .auditor
            .log_account_event(
                AuditEventType::ProfileUpdated,
                auth.user_id,
                Some(auth.user_id),
                client_ip(&headers),
            )
            .await;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Change the authenticated user's password
    async fn handle_change_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ChangePasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let service = AuthService::new(resources.clone());
        service.change_password(auth.user_id, request).await?;

        resources
            .auditor
            .log_account_event(
                AuditEventType::PasswordChanged,
                auth.user_id,
                Some(auth.user_id),
                client_ip(&headers),
            )
            .await;

        Ok((
            StatusCode::OK,
            Json(json!({ "message": "Password changed" })),
        )
            .into_response())
    }

    /// Dashboard stats for the authenticated user
    async fn handle_user_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let service = AuthService::new(resources);
        let stats = service.user_stats(auth.user_id).await?;

        Ok((StatusCode::OK, Json(stats)).into_response())
    }
}

/// Best-effort client IP from proxy headers
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
}

/// Client user agent header
fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
