// ABOUTME: Rate limiting engine for API request throttling
// ABOUTME: Fixed-window per-user limits with reset metadata for response headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! # Unified Rate Limiting System
//!
//! A fixed-window, per-user request limiter. Each authenticated request
//! consumes one slot from the caller's window; when the window is empty
//! the request is rejected with 429 and a Retry-After hint. The window
//! state lives in process memory (`DashMap`), which is sufficient for a
//! single-instance deployment.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::config::RateLimitConfig;

/// Rate limit outcome for one request
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    /// Whether the request is rate limited
    pub is_rate_limited: bool,
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// When the current window resets
    pub reset_at: DateTime<Utc>,
}

impl RateLimitStatus {
    /// Seconds until the window resets (for Retry-After)
    #[must_use]
    pub fn retry_after_secs(&self) -> u64 {
        let secs = (self.reset_at - Utc::now()).num_seconds();
        u64::try_from(secs.max(1)).unwrap_or(1)
    }
}

/// Per-user window state
#[derive(Debug, Clone, Copy)]
struct WindowState {
    window_start: DateTime<Utc>,
    count: u32,
}

/// Fixed-window per-user request limiter
pub struct ApiRateLimiter {
    config: RateLimitConfig,
    windows: DashMap<Uuid, WindowState>,
}

impl ApiRateLimiter {
    /// Create a limiter from configuration
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Record one request for a user and report the limit status
    ///
    /// Disabled limiters always report an unlimited, non-limited status.
    #[must_use]
    pub fn check(&self, user_id: Uuid) -> RateLimitStatus {
        let now = Utc::now();
        let window = Duration::seconds(i64::try_from(self.config.window_secs).unwrap_or(60));

        if !self.config.enabled {
            return RateLimitStatus {
                is_rate_limited: false,
                limit: u32::MAX,
                remaining: u32::MAX,
                reset_at: now + window,
            };
        }

        let mut entry = self.windows.entry(user_id).or_insert(WindowState {
            window_start: now,
            count: 0,
        });

        // Window rolled over; start fresh
        if now - entry.window_start >= window {
            entry.window_start = now;
            entry.count = 0;
        }

        let limit = self.config.requests_per_window;
        let reset_at = entry.window_start + window;

        if entry.count >= limit {
            return RateLimitStatus {
                is_rate_limited: true,
                limit,
                remaining: 0,
                reset_at,
            };
        }

        entry.count += 1;
        RateLimitStatus {
            is_rate_limited: false,
            limit,
            remaining: limit - entry.count,
            reset_at,
        }
    }

    /// Drop expired windows to bound memory on long-running servers
    pub fn evict_stale(&self) {
        let now = Utc::now();
        let window = Duration::seconds(i64::try_from(self.config.window_secs).unwrap_or(60));
        self.windows
            .retain(|_, state| now - state.window_start < window);
    }
}
