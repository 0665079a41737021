// ABOUTME: Production logging and structured output
// ABOUTME: Initializes the tracing subscriber with env-filter and optional JSON formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Logging setup.
//!
//! `RUST_LOG` controls filtering (default `info`); `LOG_FORMAT=json`
//! switches to structured JSON output for log shippers.

use std::env;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber
///
/// Safe to call once per process; later calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init();
    } else {
        let _ = fmt().with_env_filter(filter).compact().try_init();
    }
}
