// ABOUTME: Core database management with an embedded migration system for SQLite
// ABOUTME: Handles schema setup plus user, activity, nutrition, workout plan, analytics, and audit storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Database layer.
//!
//! [`Database`] wraps a `sqlx` SQLite pool. Table groups live in focused
//! submodules, each contributing an `impl Database` block, so the route
//! services see one connection type with domain-grouped methods.

/// Logged workout session storage and aggregation queries
pub mod activities;
/// API usage recording and date-bucket aggregation
pub mod analytics;
/// Audit event persistence and querying
pub mod audit;
/// Nutrition entry storage and daily macro totals
pub mod nutrition;
/// User account management and authentication lookups
pub mod users;
/// Workout plan storage
pub mod workout_plans;

pub use activities::{ActivityFilter, DailyActivityTotals, WeeklySummary};
pub use analytics::{DailyUsageBucket, EndpointCount, UsageOverview, UserUsageSummary};
pub use nutrition::DailyMacroTotals;

use sqlx::{Pool, Sqlite, SqlitePool};
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the database URL is invalid or malformed
    /// - the connection fails
    /// - `SQLite` file creation fails
    /// - the migration process fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run all database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any migration fails or the connection is lost.
    pub async fn migrate(&self) -> AppResult<()> {
        info!("Running database migrations...");

        // Migrations are embedded at compile time from ./migrations, so they
        // are available regardless of working directory.
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Lightweight connectivity probe used by health checks
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer a trivial query.
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }
}
