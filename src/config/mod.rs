// ABOUTME: Configuration management for the Stride API server
// ABOUTME: Environment-driven server configuration with typed sections and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

/// Environment-based server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, ExternalServicesConfig, HttpConfig, ProxyServiceConfig,
    RateLimitConfig, ServerConfig,
};
