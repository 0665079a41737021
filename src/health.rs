// ABOUTME: Health checks and monitoring
// ABOUTME: Liveness and readiness probes with database connectivity and latency measurement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Health checking.
//!
//! Two probes: liveness (`/health`) answers as long as the process runs,
//! readiness (`/health/ready`) additionally pings the database and
//! reports per-component status with latency.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::database::Database;

/// Overall service health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All components operational
    Healthy,
    /// Some components slow or partially failing
    Degraded,
    /// A required component is down
    Unhealthy,
}

/// Health of one checked component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Probe latency in milliseconds
    pub latency_ms: u64,
    /// Failure detail, when unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Readiness report for the whole service
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    /// Overall status (worst component wins)
    pub status: HealthStatus,
    /// Seconds since the server started
    pub uptime_secs: u64,
    /// Individual component probes
    pub components: Vec<ComponentHealth>,
}

/// Database latency above which readiness reports `Degraded`
const DB_DEGRADED_LATENCY_MS: u64 = 250;

/// Health checker holding probe dependencies
pub struct HealthChecker {
    database: Arc<Database>,
    started_at: Instant,
}

impl HealthChecker {
    /// Create a checker; call once at startup so uptime is meaningful
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self {
            database,
            started_at: Instant::now(),
        }
    }

    /// Seconds since the server started
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Run the readiness probes
    pub async fn readiness(&self) -> ReadinessReport {
        let database = self.check_database().await;

        let status = database.status;

        ReadinessReport {
            status,
            uptime_secs: self.uptime_secs(),
            components: vec![database],
        }
    }

    /// Probe database connectivity and classify latency
    async fn check_database(&self) -> ComponentHealth {
        let start = Instant::now();
        let result = self.database.ping().await;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(()) => ComponentHealth {
                name: "database".to_owned(),
                status: if latency_ms > DB_DEGRADED_LATENCY_MS {
                    HealthStatus::Degraded
                } else {
                    HealthStatus::Healthy
                },
                latency_ms,
                detail: None,
            },
            Err(e) => ComponentHealth {
                name: "database".to_owned(),
                status: HealthStatus::Unhealthy,
                latency_ms,
                detail: Some(e.to_string()),
            },
        }
    }
}
