// ABOUTME: User management database operations
// ABOUTME: Handles user registration, authentication lookups, and profile management
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole, UserStatus};

/// Profile fields a user may update about themselves
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name, if changing
    pub display_name: Option<String>,
    /// New body weight in kilograms, if changing
    pub weight_kg: Option<f64>,
    /// New height in centimeters, if changing
    pub height_cm: Option<f64>,
    /// New date of birth, if changing
    pub date_of_birth: Option<NaiveDate>,
}

impl Database {
    /// Create a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already in use or the insert fails.
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        if let Some(existing) = self.get_user_by_email(&user.email).await? {
            if existing.id != user.id {
                return Err(AppError::conflict("Email already in use by another user"));
            }
        }

        sqlx::query(
            r"
            INSERT INTO users (
                id, email, display_name, password_hash, role, user_status,
                is_active, approved_by, approved_at, weight_kg, height_cm,
                date_of_birth, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT(id) DO UPDATE SET
                display_name = $3,
                password_hash = $4,
                role = $5,
                user_status = $6,
                is_active = $7,
                approved_by = $8,
                approved_at = $9,
                last_active = CURRENT_TIMESTAMP
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.user_status.as_str())
        .bind(user.is_active)
        .bind(user.approved_by.map(|id| id.to_string()))
        .bind(user.approved_at)
        .bind(user.weight_kg)
        .bind(user.height_cm)
        .bind(user.date_of_birth.map(|d| d.to_string()))
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let user_id_str = user_id.to_string();
        self.get_user_by_field("id", &user_id_str).await
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_user_by_field("email", email).await
    }

    /// Get a user by email, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the user is not found
    pub async fn get_user_by_email_required(&self, email: &str) -> AppResult<User> {
        self.get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user with email {email}")))
    }

    /// Internal implementation for getting a user by a unique column
    async fn get_user_by_field(&self, field: &str, value: &str) -> AppResult<Option<User>> {
        let query = format!(
            r"
            SELECT id, email, display_name, password_hash, role, user_status,
                   is_active, approved_by, approved_at, weight_kg, height_cm,
                   date_of_birth, created_at, last_active
            FROM users WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by {field}: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Convert a database row to a User struct
    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        let id: String = row.get("id");
        let role_str: String = row.get("role");
        let status_str: String = row.get("user_status");
        let approved_by: Option<String> = row.get("approved_by");
        let dob_str: Option<String> = row.get("date_of_birth");

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Failed to parse user id UUID: {e}")))?,
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            role: UserRole::from_str_lossy(&role_str),
            user_status: UserStatus::from_str_lossy(&status_str),
            is_active: row.get("is_active"),
            approved_by: approved_by.and_then(|id_str| {
                Uuid::parse_str(&id_str)
                    .inspect_err(|e| {
                        warn!(
                            user_id = %id,
                            approved_by_str = %id_str,
                            error = %e,
                            "Invalid approved_by UUID in database - setting to None"
                        );
                    })
                    .ok()
            }),
            approved_at: row.get("approved_at"),
            weight_kg: row.get("weight_kg"),
            height_cm: row.get("height_cm"),
            date_of_birth: dob_str.and_then(|s| s.parse().ok()),
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }

    /// Update user's last active timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;
        Ok(())
    }

    /// Get total user count
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user count: {e}")))?;
        Ok(count)
    }

    /// Update a user's profile fields, leaving unset fields untouched
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the update fails
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> AppResult<User> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                display_name = COALESCE($1, display_name),
                weight_kg = COALESCE($2, weight_kg),
                height_cm = COALESCE($3, height_cm),
                date_of_birth = COALESCE($4, date_of_birth),
                last_active = CURRENT_TIMESTAMP
            WHERE id = $5
            ",
        )
        .bind(&update.display_name)
        .bind(update.weight_kg)
        .bind(update.height_cm)
        .bind(update.date_of_birth.map(|d| d.to_string()))
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user profile: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("user {user_id}")));
        }

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user after profile update"))
    }

    /// Update user's password hash
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the update fails
    pub async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                password_hash = $1,
                last_active = CURRENT_TIMESTAMP
            WHERE id = $2
            ",
        )
        .bind(password_hash)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user password: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("user {user_id}")));
        }

        Ok(())
    }

    /// Update user status (approve/suspend)
    ///
    /// # Arguments
    /// * `user_id` - The user to update
    /// * `new_status` - The new status to set
    /// * `changed_by` - Admin performing the change (stamped as approver on activation)
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the update fails
    pub async fn update_user_status(
        &self,
        user_id: Uuid,
        new_status: UserStatus,
        changed_by: Option<Uuid>,
    ) -> AppResult<User> {
        // approved_by/approved_at only make sense on activation
        let (approved_by, approved_at) = if new_status == UserStatus::Active {
            (changed_by.map(|id| id.to_string()), Some(chrono::Utc::now()))
        } else {
            (None, None)
        };

        let result = sqlx::query(
            r"
            UPDATE users SET
                user_status = $1,
                approved_by = $2,
                approved_at = $3,
                last_active = CURRENT_TIMESTAMP
            WHERE id = $4
            ",
        )
        .bind(new_status.as_str())
        .bind(approved_by)
        .bind(approved_at)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("user {user_id}")));
        }

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user after status update"))
    }

    /// Get users by status, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_users_by_status(&self, status: UserStatus) -> AppResult<Vec<User>> {
        let rows = sqlx::query(
            r"
            SELECT id, email, display_name, password_hash, role, user_status,
                   is_active, approved_by, approved_at, weight_kg, height_cm,
                   date_of_birth, created_at, last_active
            FROM users
            WHERE user_status = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get users by status: {e}")))?;

        rows.iter().map(Self::row_to_user).collect()
    }

    /// Delete a user and all associated data
    ///
    /// Child rows are removed explicitly; SQLite only honors the CASCADE
    /// constraints when the foreign key pragma is enabled on the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the delete fails
    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let user_id_str = user_id.to_string();

        for table in ["activities", "nutrition_entries", "workout_plans"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
                .bind(&user_id_str)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to delete user data from {table}: {e}"))
                })?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(&user_id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete user: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("user {user_id}")));
        }

        Ok(())
    }
}
