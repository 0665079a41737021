// ABOUTME: Security audit event types for compliance and investigation
// ABOUTME: AuditEventType, AuditSeverity, and AuditEvent DTOs with builder pattern
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of audit events tracked by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Authentication events
    /// User successfully logged in
    UserLogin,
    /// User logged out
    UserLogout,
    /// Authentication attempt failed
    AuthenticationFailed,
    /// Session token was refreshed
    TokenRefreshed,

    // Account lifecycle events
    /// New account was registered
    UserRegistered,
    /// Account was approved by an admin
    UserApproved,
    /// Account was suspended by an admin
    UserSuspended,
    /// Account was deleted
    UserDeleted,
    /// Password was changed
    PasswordChanged,
    /// Profile fields were updated
    ProfileUpdated,

    // Administrative events
    /// Admin accessed the audit trail or analytics
    AdminDataAccessed,
    /// Security policy was violated (e.g. repeated auth failures)
    SecurityPolicyViolation,
}

impl AuditEventType {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserLogin => "user_login",
            Self::UserLogout => "user_logout",
            Self::AuthenticationFailed => "authentication_failed",
            Self::TokenRefreshed => "token_refreshed",
            Self::UserRegistered => "user_registered",
            Self::UserApproved => "user_approved",
            Self::UserSuspended => "user_suspended",
            Self::UserDeleted => "user_deleted",
            Self::PasswordChanged => "password_changed",
            Self::ProfileUpdated => "profile_updated",
            Self::AdminDataAccessed => "admin_data_accessed",
            Self::SecurityPolicyViolation => "security_policy_violation",
        }
    }

    /// Parse from a stored string, defaulting unknown values to `AuthenticationFailed`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "user_login" => Self::UserLogin,
            "user_logout" => Self::UserLogout,
            "token_refreshed" => Self::TokenRefreshed,
            "user_registered" => Self::UserRegistered,
            "user_approved" => Self::UserApproved,
            "user_suspended" => Self::UserSuspended,
            "user_deleted" => Self::UserDeleted,
            "password_changed" => Self::PasswordChanged,
            "profile_updated" => Self::ProfileUpdated,
            "admin_data_accessed" => Self::AdminDataAccessed,
            "security_policy_violation" => Self::SecurityPolicyViolation,
            _ => Self::AuthenticationFailed,
        }
    }
}

/// Severity levels for audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Informational event (normal operation)
    Info,
    /// Warning event (potential issue)
    Warning,
    /// Error event (operation failed)
    Error,
    /// Critical event (security incident)
    Critical,
}

impl AuditSeverity {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Parse from a stored string, defaulting unknown values to `Info`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "warning" => Self::Warning,
            "error" => Self::Error,
            "critical" => Self::Critical,
            _ => Self::Info,
        }
    }
}

/// Security audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier
    pub event_id: Uuid,
    /// Type of audit event
    pub event_type: AuditEventType,
    /// Severity level
    pub severity: AuditSeverity,
    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
    /// User who performed the action (if applicable)
    pub user_id: Option<Uuid>,
    /// Source IP address (if available)
    pub source_ip: Option<String>,
    /// User agent string (if available)
    pub user_agent: Option<String>,
    /// Resource affected by the event (e.g. "user:123", "activity:456")
    pub resource: Option<String>,
    /// Action performed (e.g. "create", "update", "delete", "access")
    pub action: String,
    /// Result of the action (e.g. "success", "failure", "denied")
    pub result: String,
    /// Event description
    pub description: String,
    /// Additional event metadata
    pub metadata: serde_json::Value,
}

impl AuditEvent {
    /// Create a new audit event
    #[must_use]
    pub fn new(
        event_type: AuditEventType,
        severity: AuditSeverity,
        description: String,
        action: String,
        result: String,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            severity,
            timestamp: Utc::now(),
            user_id: None,
            source_ip: None,
            user_agent: None,
            resource: None,
            action,
            result,
            description,
            metadata: serde_json::Value::Null,
        }
    }

    /// Set user ID for the event
    #[must_use]
    pub const fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set source IP address
    #[must_use]
    pub fn with_source_ip(mut self, source_ip: String) -> Self {
        self.source_ip = Some(source_ip);
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    /// Set resource affected
    #[must_use]
    pub fn with_resource(mut self, resource: String) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Add metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
