// ABOUTME: Environment variable parsing into the typed ServerConfig structure
// ABOUTME: Provides defaults for development and validation for production settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Environment-driven configuration.
//!
//! All runtime configuration is read from environment variables by
//! [`ServerConfig::from_env`]. Development defaults keep a bare `cargo run`
//! working; production deployments are expected to set every variable
//! explicitly (and MUST set `JWT_SECRET`).

use std::env;

use url::Url;

use crate::errors::{AppError, AppResult};

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Port the REST API listens on
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify JWTs (HS256)
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Grace window after expiry during which a token may still be refreshed
    pub refresh_grace_hours: i64,
    /// Whether new registrations are activated without admin approval
    pub auto_approve_users: bool,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; empty means same-origin only
    pub allowed_origins: Vec<String>,
}

/// Per-user request rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enforced
    pub enabled: bool,
    /// Requests allowed per window
    pub requests_per_window: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

/// Configuration for a single external proxy service
#[derive(Debug, Clone)]
pub struct ProxyServiceConfig {
    /// Base URL of the upstream API
    pub base_url: String,
    /// API key, if the upstream requires one
    pub api_key: String,
    /// Response cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Upstream request budget per minute
    pub rate_limit_per_minute: u32,
}

/// External service proxies (nutrition data, exercise catalog)
#[derive(Debug, Clone)]
pub struct ExternalServicesConfig {
    /// Nutrition data service (FoodData-Central-style)
    pub food_data: ProxyServiceConfig,
    /// Exercise catalog service
    pub exercise_catalog: ProxyServiceConfig,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listener settings
    pub http: HttpConfig,
    /// Database connection URL (sqlite:...)
    pub database_url: String,
    /// Authentication settings
    pub auth: AuthConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
    /// External proxy services
    pub external: ExternalServicesConfig,
}

const DEFAULT_HTTP_PORT: u16 = 8081;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_REFRESH_GRACE_HOURS: i64 = 24;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 120;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_FOOD_DATA_URL: &str = "https://api.nal.usda.gov/fdc/v1";
const DEFAULT_EXERCISE_CATALOG_URL: &str = "https://wger.de/api/v2";
const DEFAULT_PROXY_CACHE_TTL_SECS: u64 = 86_400;
const DEFAULT_PROXY_RATE_LIMIT: u32 = 30;

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable, or if a
    /// configured URL is invalid.
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            http: HttpConfig {
                port: env_parse("HTTP_PORT", DEFAULT_HTTP_PORT)?,
                request_timeout_secs: env_parse(
                    "REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )?,
                max_body_bytes: env_parse("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            },
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/stride.db".to_owned()),
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "dev-secret-change-me".to_owned()),
                jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
                refresh_grace_hours: env_parse(
                    "REFRESH_GRACE_HOURS",
                    DEFAULT_REFRESH_GRACE_HOURS,
                )?,
                auto_approve_users: env_bool("AUTO_APPROVE_USERS", true),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ORIGINS")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_owned())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            rate_limit: RateLimitConfig {
                enabled: env_bool("RATE_LIMIT_ENABLED", true),
                requests_per_window: env_parse(
                    "RATE_LIMIT_REQUESTS",
                    DEFAULT_RATE_LIMIT_REQUESTS,
                )?,
                window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW_SECS)?,
            },
            external: ExternalServicesConfig {
                food_data: ProxyServiceConfig {
                    base_url: env::var("FOOD_DATA_BASE_URL")
                        .unwrap_or_else(|_| DEFAULT_FOOD_DATA_URL.to_owned()),
                    api_key: env::var("FOOD_DATA_API_KEY").unwrap_or_default(),
                    cache_ttl_secs: env_parse(
                        "FOOD_DATA_CACHE_TTL_SECS",
                        DEFAULT_PROXY_CACHE_TTL_SECS,
                    )?,
                    rate_limit_per_minute: env_parse(
                        "FOOD_DATA_RATE_LIMIT",
                        DEFAULT_PROXY_RATE_LIMIT,
                    )?,
                },
                exercise_catalog: ProxyServiceConfig {
                    base_url: env::var("EXERCISE_CATALOG_BASE_URL")
                        .unwrap_or_else(|_| DEFAULT_EXERCISE_CATALOG_URL.to_owned()),
                    api_key: env::var("EXERCISE_CATALOG_API_KEY").unwrap_or_default(),
                    cache_ttl_secs: env_parse(
                        "EXERCISE_CATALOG_CACHE_TTL_SECS",
                        DEFAULT_PROXY_CACHE_TTL_SECS,
                    )?,
                    rate_limit_per_minute: env_parse(
                        "EXERCISE_CATALOG_RATE_LIMIT",
                        DEFAULT_PROXY_RATE_LIMIT,
                    )?,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    fn validate(&self) -> AppResult<()> {
        if self.auth.jwt_expiry_hours <= 0 {
            return Err(AppError::invalid_input("JWT_EXPIRY_HOURS must be positive"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(AppError::invalid_input(
                "RATE_LIMIT_WINDOW_SECS must be positive",
            ));
        }
        for (name, url) in [
            ("FOOD_DATA_BASE_URL", &self.external.food_data.base_url),
            (
                "EXERCISE_CATALOG_BASE_URL",
                &self.external.exercise_catalog.base_url,
            ),
        ] {
            Url::parse(url)
                .map_err(|e| AppError::invalid_input(format!("{name} is not a valid URL: {e}")))?;
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to a default when unset
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| AppError::invalid_input(format!("{name} has invalid value: {value}"))),
        Err(_) => Ok(default),
    }
}

/// Parse a boolean environment variable ("true"/"1" are truthy)
fn env_bool(name: &str, default: bool) -> bool {
    env::var(name).map_or(default, |v| {
        matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::from_env().expect("default config should load");
        assert!(config.auth.jwt_expiry_hours > 0);
        assert!(config.rate_limit.window_secs > 0);
    }

    #[test]
    fn env_bool_accepts_common_truthy_values() {
        assert!(env_bool("STRIDE_TEST_UNSET_FLAG", true));
        assert!(!env_bool("STRIDE_TEST_UNSET_FLAG", false));
    }
}
