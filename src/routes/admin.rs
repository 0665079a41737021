// ABOUTME: Admin user management route handlers
// ABOUTME: User listing by status, approval, suspension, deletion, and the audit trail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Admin routes.
//!
//! All endpoints require the admin role. Responses carry sanitized user
//! summaries only; password hashes never leave the database layer's
//! `User` (and that type refuses to serialize them anyway).

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    context::ServerResources,
    errors::AppError,
    models::{AuditEventType, User, UserStatus},
};

/// Query parameters for user listing
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Status filter (`pending`, `active`, `suspended`); default `active`
    pub status: Option<String>,
}

/// Query parameters for the audit trail
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Number of events to return (default 100, max 500)
    pub limit: Option<u32>,
}

/// Sanitized user summary for listings
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// User ID
    pub id: String,
    /// User email
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Role
    pub role: String,
    /// Account status
    pub user_status: String,
    /// When the user was created
    pub created_at: String,
    /// Last active time
    pub last_active: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.as_str().to_owned(),
            user_status: user.user_status.to_string(),
            created_at: user.created_at.to_rfc3339(),
            last_active: user.last_active.to_rfc3339(),
        }
    }
}

/// Admin routes (axum)
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/users", get(Self::handle_list_users))
            .route(
                "/api/admin/users/:user_id/approve",
                post(Self::handle_approve_user),
            )
            .route(
                "/api/admin/users/:user_id/suspend",
                post(Self::handle_suspend_user),
            )
            .route("/api/admin/users/:user_id", delete(Self::handle_delete_user))
            .route("/api/admin/audit/events", get(Self::handle_audit_events))
            .with_state(resources)
    }

    /// List users filtered by status
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListUsersQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let status = match query.status.as_deref() {
            None | Some("active") => UserStatus::Active,
            Some("pending") => UserStatus::Pending,
            Some("suspended") => UserStatus::Suspended,
            Some(other) => {
                return Err(AppError::invalid_input(format!(
                    "Unknown status filter: {other}"
                )))
            }
        };

        let users = resources.database.get_users_by_status(status).await?;
        let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();

        let total = summaries.len();
        info!(count = total, status = %status, "Listed users");

        Ok((
            StatusCode::OK,
            Json(json!({
                "users": summaries,
                "total": total,
            })),
        )
            .into_response())
    }

    /// Approve a pending user
    async fn handle_approve_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let user = resources
            .database
            .update_user_status(user_id, UserStatus::Active, Some(auth.user_id))
            .await?;

        resources
            .auditor
            .log_account_event(
                AuditEventType::UserApproved,
                user_id,
                Some(auth.user_id),
                None,
            )
            .await;

        info!(user_id = %user_id, approved_by = %auth.user_id, "User approved");

        Ok((
            StatusCode::OK,
            Json(json!({
                "message": "User approved",
                "user": UserSummary::from(&user),
            })),
        )
            .into_response())
    }

    /// Suspend a user
    async fn handle_suspend_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        if user_id == auth.user_id {
            return Err(AppError::invalid_input("Admins cannot suspend themselves"));
        }

        let user = resources
            .database
            .update_user_status(user_id, UserStatus::Suspended, Some(auth.user_id))
            .await?;

        resources
            .auditor
            .log_account_event(
                AuditEventType::UserSuspended,
                user_id,
                Some(auth.user_id),
                None,
            )
            .await;

        info!(user_id = %user_id, suspended_by = %auth.user_id, "User suspended");

        Ok((
            StatusCode::OK,
            Json(json!({
                "message": "User suspended",
                "user": UserSummary::from(&user),
            })),
        )
            .into_response())
    }

    /// Delete a user and their data
    async fn handle_delete_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        if user_id == auth.user_id {
            return Err(AppError::invalid_input("Admins cannot delete themselves"));
        }

        resources.database.delete_user(user_id).await?;

        resources
            .auditor
            .log_account_event(
                AuditEventType::UserDeleted,
                user_id,
                Some(auth.user_id),
                None,
            )
            .await;

        info!(user_id = %user_id, deleted_by = %auth.user_id, "User deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Recent audit events
    async fn handle_audit_events(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<AuditQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let limit = query.limit.unwrap_or(100).clamp(1, 500);
        let events = resources.database.get_recent_audit_events(limit).await?;

        resources
            .auditor
            .log_admin_access(auth.user_id, "audit:events")
            .await;

        let total = events.len();
        Ok((
            StatusCode::OK,
            Json(json!({
                "events": events,
                "total": total,
            })),
        )
            .into_response())
    }
}
