// ABOUTME: Security audit logging for authentication and account lifecycle operations
// ABOUTME: Writes audit trails to structured logs and the audit_events table for investigation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! # Security Audit Module
//!
//! Audit logging for security-sensitive operations:
//! - login, logout, and failed authentication attempts
//! - registration, approval, suspension, and deletion of accounts
//! - password changes and profile updates
//! - admin access to analytics and the audit trail itself

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{AuditEvent, AuditEventType, AuditSeverity};

/// Audit logger for security events
pub struct SecurityAuditor {
    /// Database connection for storing audit events
    database: Arc<Database>,
}

impl SecurityAuditor {
    /// Create new security auditor
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Log audit event to structured logger based on severity
    fn log_to_structured_logger(event: &AuditEvent) {
        match event.severity {
            AuditSeverity::Info => info!(
                event_id = %event.event_id,
                event_type = ?event.event_type,
                user_id = ?event.user_id,
                resource = ?event.resource,
                action = %event.action,
                result = %event.result,
                "Security audit event: {}",
                event.description
            ),
            AuditSeverity::Warning => warn!(
                event_id = %event.event_id,
                event_type = ?event.event_type,
                user_id = ?event.user_id,
                resource = ?event.resource,
                action = %event.action,
                result = %event.result,
                "Security audit warning: {}",
                event.description
            ),
            AuditSeverity::Error | AuditSeverity::Critical => error!(
                event_id = %event.event_id,
                event_type = ?event.event_type,
                user_id = ?event.user_id,
                resource = ?event.resource,
                action = %event.action,
                result = %event.result,
                "Security audit error: {}",
                event.description
            ),
        }
    }

    /// Log an audit event
    ///
    /// # Errors
    ///
    /// Returns an error if the audit event cannot be stored
    pub async fn log_event(&self, event: AuditEvent) -> AppResult<()> {
        // Structured logger first, for immediate visibility
        Self::log_to_structured_logger(&event);

        self.database.store_audit_event(&event).await?;
        debug!("Stored audit event {} in database", event.event_id);

        if matches!(event.severity, AuditSeverity::Critical) {
            Self::trigger_security_alert(&event);
        }

        Ok(())
    }

    /// Log an audit event from the request path, swallowing storage failures.
    ///
    /// Auditing must never fail the request it describes.
    pub async fn log_event_best_effort(&self, event: AuditEvent) {
        if let Err(e) = self.log_event(event).await {
            error!("Failed to store audit event: {e}");
        }
    }

    /// Trigger security alert for critical events
    fn trigger_security_alert(event: &AuditEvent) {
        error!(
            target: "security_alert",
            event_id = %event.event_id,
            event_type = ?event.event_type,
            user_id = ?event.user_id,
            source_ip = ?event.source_ip,
            description = %event.description,
            "SECURITY ALERT: {}", event.description
        );
    }

    /// Log an authentication event (login, logout, refresh, failure)
    pub async fn log_authentication_event(
        &self,
        event_type: AuditEventType,
        user_id: Option<Uuid>,
        source_ip: Option<String>,
        user_agent: Option<String>,
        success: bool,
    ) {
        let severity = if success {
            AuditSeverity::Info
        } else {
            AuditSeverity::Warning
        };

        let description = match (event_type, success) {
            (AuditEventType::UserLogin, true) => "User successfully logged in".to_owned(),
            (AuditEventType::UserLogin, false) => "User login failed".to_owned(),
            (AuditEventType::UserLogout, _) => "User logged out".to_owned(),
            (AuditEventType::TokenRefreshed, _) => "Session token refreshed".to_owned(),
            _ => format!("Authentication event: {event_type:?}"),
        };

        let mut event = AuditEvent::new(
            event_type,
            severity,
            description,
            "authenticate".to_owned(),
            if success { "success" } else { "failure" }.to_owned(),
        );

        if let Some(uid) = user_id {
            event = event.with_user_id(uid);
        }
        if let Some(ip) = source_ip {
            event = event.with_source_ip(ip);
        }
        if let Some(ua) = user_agent {
            event = event.with_user_agent(ua);
        }

        self.log_event_best_effort(event).await;
    }

    /// Log an account lifecycle event (registered, approved, suspended, deleted)
    pub async fn log_account_event(
        &self,
        event_type: AuditEventType,
        subject_user_id: Uuid,
        actor_user_id: Option<Uuid>,
        source_ip: Option<String>,
    ) {
        let (severity, action) = match event_type {
            AuditEventType::UserSuspended => (AuditSeverity::Warning, "suspend"),
            AuditEventType::UserDeleted => (AuditSeverity::Warning, "delete"),
            AuditEventType::UserApproved => (AuditSeverity::Info, "approve"),
            AuditEventType::PasswordChanged => (AuditSeverity::Info, "change_password"),
            AuditEventType::ProfileUpdated => (AuditSeverity::Info, "update"),
            _ => (AuditSeverity::Info, "create"),
        };

        let mut event = AuditEvent::new(
            event_type,
            severity,
            format!("Account event {action} for user {subject_user_id}"),
            action.to_owned(),
            "success".to_owned(),
        )
        .with_resource(format!("user:{subject_user_id}"));

        // The actor is the audited user; the subject rides in the resource.
        if let Some(actor) = actor_user_id {
            event = event.with_user_id(actor);
        } else {
            event = event.with_user_id(subject_user_id);
        }
        if let Some(ip) = source_ip {
            event = event.with_source_ip(ip);
        }

        self.log_event_best_effort(event).await;
    }

    /// Log admin access to analytics or the audit trail
    pub async fn log_admin_access(&self, admin_user_id: Uuid, resource: &str) {
        let event = AuditEvent::new(
            AuditEventType::AdminDataAccessed,
            AuditSeverity::Info,
            format!("Admin accessed {resource}"),
            "access".to_owned(),
            "success".to_owned(),
        )
        .with_user_id(admin_user_id)
        .with_resource(resource.to_owned());

        self.log_event_best_effort(event).await;
    }
}
