// ABOUTME: Security utilities for the HTTP surface
// ABOUTME: Audit logging and secure cookie helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

/// Security audit logging for authentication and account lifecycle events
pub mod audit;
/// Secure HTTP cookie helpers
pub mod cookies;

pub use audit::SecurityAuditor;
