// ABOUTME: Authentication and session management
// ABOUTME: JWT generation/validation lifecycle and per-request authentication with role and status checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Authentication primitives.
//!
//! [`AuthManager`] owns the JWT lifecycle: signing, validation, and the
//! refresh grace window. [`AuthMiddleware`] turns request headers into an
//! [`AuthResult`], accepting either a bearer token or the httpOnly auth
//! cookie, and re-checks account status against the database so a
//! suspension takes effect immediately rather than at token expiry.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole, UserStatus};
use crate::security::cookies::get_cookie_value;

/// JWT claims issued by this server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    /// User email at issue time
    pub email: String,
    /// User role at issue time
    pub role: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Outcome of a successful request authentication
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: Uuid,
    /// Role loaded fresh from the database
    pub role: UserRole,
    /// Account status loaded fresh from the database
    pub user_status: UserStatus,
}

impl AuthResult {
    /// Require the admin role
    ///
    /// # Errors
    /// Returns a permission error for non-admin callers.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::permission_denied("Admin access required"))
        }
    }

    /// Require an active (approved) account
    ///
    /// Pending users may authenticate and read, but mutating domain routes
    /// require approval first.
    ///
    /// # Errors
    /// Returns a permission error for non-active accounts.
    pub fn require_active(&self) -> AppResult<()> {
        if self.user_status == UserStatus::Active {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "Account is pending approval; this operation requires an active account",
            ))
        }
    }
}

/// JWT lifecycle manager (HS256)
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
    refresh_grace_hours: i64,
}

impl AuthManager {
    /// Create a manager from auth configuration
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry_hours: config.jwt_expiry_hours,
            refresh_grace_hours: config.refresh_grace_hours,
        }
    }

    /// Token lifetime in seconds
    #[must_use]
    pub const fn expiry_seconds(&self) -> i64 {
        self.expiry_hours * 3600
    }

    /// Generate a signed token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for expired tokens and `AuthInvalid` for
    /// anything else that fails validation.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::auth_expired("Token has expired")
                }
                _ => AppError::auth_invalid("Invalid token"),
            })
    }

    /// Validate a token for refresh, tolerating expiry within the grace window
    ///
    /// The signature must still verify; only the `exp` check is relaxed.
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` when the token is past expiry plus grace, and
    /// `AuthInvalid` for signature or structure failures.
    pub fn validate_for_refresh(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::auth_invalid("Invalid token"))?;

        let grace_deadline = claims.exp + self.refresh_grace_hours * 3600;
        if Utc::now().timestamp() > grace_deadline {
            return Err(AppError::auth_expired(
                "Token is too old to refresh; log in again",
            ));
        }

        Ok(claims)
    }
}

/// Per-request authentication over headers and cookies
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create the middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers
    ///
    /// Accepts `Authorization: Bearer <token>` or the `auth_token` cookie.
    /// Role and status come from the database, not the token, so admin
    /// demotions and suspensions apply immediately.
    ///
    /// # Errors
    ///
    /// Returns an auth error when credentials are missing, invalid, or the
    /// account is suspended.
    pub async fn authenticate_request(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let token = extract_token(headers)?;
        let claims = self.auth_manager.validate_token(&token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Malformed token subject"))?;

        let user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Unknown user"))?;

        if !user.user_status.can_login() || !user.is_active {
            debug!(user_id = %user_id, status = %user.user_status, "Rejected suspended account");
            return Err(AppError::auth_invalid("Account is suspended"));
        }

        Ok(AuthResult {
            user_id: user.id,
            role: user.role,
            user_status: user.user_status,
        })
    }

    /// The JWT manager backing this middleware
    #[must_use]
    pub fn auth_manager(&self) -> &Arc<AuthManager> {
        &self.auth_manager
    }
}

/// Pull a token from the Authorization header or the auth cookie
fn extract_token(headers: &HeaderMap) -> AppResult<String> {
    if let Some(auth_header) = headers.get("authorization").and_then(|h| h.to_str().ok()) {
        return auth_header
            .strip_prefix("Bearer ")
            .map(str::to_owned)
            .ok_or_else(|| AppError::auth_invalid("Invalid Authorization header format"));
    }

    get_cookie_value(headers, "auth_token")
        .ok_or_else(|| AppError::auth_required("Missing authorization header or cookie"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn test_manager(expiry_hours: i64, grace_hours: i64) -> AuthManager {
        AuthManager::new(&AuthConfig {
            jwt_secret: "test-secret".to_owned(),
            jwt_expiry_hours: expiry_hours,
            refresh_grace_hours: grace_hours,
            auto_approve_users: true,
        })
    }

    fn test_user() -> User {
        User::new(
            "jwt@example.com".to_owned(),
            "hash".to_owned(),
            Some("JWT".to_owned()),
        )
    }

    #[test]
    fn generated_tokens_validate() {
        let manager = test_manager(24, 24);
        let user = test_user();
        let token = manager.generate_token(&user).expect("sign token");

        let claims = manager.validate_token(&token).expect("validate token");
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn tokens_from_other_secrets_are_rejected() {
        let manager = test_manager(24, 24);
        let other = AuthManager::new(&AuthConfig {
            jwt_secret: "different-secret".to_owned(),
            jwt_expiry_hours: 24,
            refresh_grace_hours: 24,
            auto_approve_users: true,
        });

        let token = other.generate_token(&test_user()).expect("sign token");
        let err = manager.validate_token(&token).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::AuthInvalid);
    }

    #[test]
    fn refresh_accepts_valid_tokens_and_rejects_garbage() {
        let manager = test_manager(24, 24);
        let token = manager.generate_token(&test_user()).expect("sign token");
        assert!(manager.validate_for_refresh(&token).is_ok());
        assert!(manager.validate_for_refresh("not-a-token").is_err());
    }

    #[test]
    fn bearer_extraction_requires_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Token abc".parse().unwrap());
        assert!(extract_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        assert_eq!(extract_token(&headers).unwrap(), "abc");
    }
}
