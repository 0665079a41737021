// ABOUTME: Shared server resources for dependency injection into route handlers
// ABOUTME: Bundles database, auth, audit, rate limiting, proxies, and health checking behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Server resource container.
//!
//! One [`ServerResources`] is built at startup and handed to every route
//! group as axum state. Handlers stay thin: they authenticate through
//! `auth_middleware`, then delegate to services that borrow what they
//! need from here.

use std::sync::Arc;

use crate::auth::{AuthManager, AuthMiddleware};
use crate::config::ServerConfig;
use crate::database::Database;
use crate::external::{ExerciseCatalogClient, FoodDataClient};
use crate::health::HealthChecker;
use crate::rate_limiting::ApiRateLimiter;
use crate::security::SecurityAuditor;

/// Everything route handlers need, built once at startup
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Database pool
    pub database: Arc<Database>,
    /// JWT lifecycle manager
    pub auth_manager: Arc<AuthManager>,
    /// Per-request authentication
    pub auth_middleware: AuthMiddleware,
    /// Security audit logger
    pub auditor: Arc<SecurityAuditor>,
    /// Per-user request limiter
    pub rate_limiter: Arc<ApiRateLimiter>,
    /// Nutrition data proxy client
    pub food_data: Arc<FoodDataClient>,
    /// Exercise catalog proxy client
    pub exercise_catalog: Arc<ExerciseCatalogClient>,
    /// Health checker
    pub health: Arc<HealthChecker>,
}

impl ServerResources {
    /// Wire up all resources from configuration and a connected database
    #[must_use]
    pub fn new(config: ServerConfig, database: Database) -> Self {
        let config = Arc::new(config);
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(&config.auth));
        let auth_middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());
        let auditor = Arc::new(SecurityAuditor::new(database.clone()));
        let rate_limiter = Arc::new(ApiRateLimiter::new(config.rate_limit.clone()));
        let food_data = Arc::new(FoodDataClient::new(config.external.food_data.clone()));
        let exercise_catalog = Arc::new(ExerciseCatalogClient::new(
            config.external.exercise_catalog.clone(),
        ));
        let health = Arc::new(HealthChecker::new(database.clone()));

        Self {
            config,
            database,
            auth_manager,
            auth_middleware,
            auditor,
            rate_limiter,
            food_data,
            exercise_catalog,
            health,
        }
    }
}
