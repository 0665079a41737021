// ABOUTME: Main library entry point for the Stride fitness tracking backend
// ABOUTME: REST API for accounts, activity logging, nutrition, workout plans, and usage analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![deny(unsafe_code)]

//! # Stride API
//!
//! A fitness-tracking backend: user accounts, JWT authentication,
//! activity/session logging, nutrition and workout plan management with
//! external data proxies, and usage analytics, exposed as a REST API
//! backed by SQLite.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers per domain, delegating to services
//! - **Database**: one pool, table groups as focused `impl` blocks
//! - **Auth**: JWT lifecycle plus per-request authentication with role
//!   and ownership checks
//! - **Middleware**: usage recording, rate limiting, CORS, tracing
//! - **External**: cached, budgeted proxies for nutrition and exercise
//!   catalog data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stride_api::config::ServerConfig;
//! use stride_api::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Stride API configured for port {}", config.http.port);
//!     Ok(())
//! }
//! ```

/// Authentication and session management
pub mod auth;

/// Configuration management and persistence
pub mod config;

/// Focused dependency injection context
pub mod context;

/// Multi-table database layer
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// External API clients (nutrition data, exercise catalog)
pub mod external;

/// Health checks and monitoring
pub mod health;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for usage recording and rate limiting
pub mod middleware;

/// Common data models for fitness data
pub mod models;

/// Cursor-based pagination for efficient data traversal
pub mod pagination;

/// Unified rate limiting system for API requests
pub mod rate_limiting;

/// HTTP routes for accounts, activities, nutrition, workouts, and analytics
pub mod routes;

/// Security audit logging and cookie helpers
pub mod security;

/// HTTP server assembly and lifecycle
pub mod server;

/// Streak calculation over activity days
pub mod streaks;

/// Declarative validation rules for request payloads
pub mod validation;
