// ABOUTME: Audit event database operations
// ABOUTME: Persists security audit events and serves the admin audit trail queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AuditEvent, AuditEventType, AuditSeverity};

impl Database {
    /// Store an audit event
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn store_audit_event(&self, event: &AuditEvent) -> AppResult<()> {
        let metadata_json = if event.metadata.is_null() {
            None
        } else {
            Some(serde_json::to_string(&event.metadata)?)
        };

        sqlx::query(
            r"
            INSERT INTO audit_events (
                event_id, event_type, severity, timestamp, user_id, source_ip,
                user_agent, resource, action, result, description, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(event.event_id.to_string())
        .bind(event.event_type.as_str())
        .bind(event.severity.as_str())
        .bind(event.timestamp)
        .bind(event.user_id.map(|id| id.to_string()))
        .bind(&event.source_ip)
        .bind(&event.user_agent)
        .bind(&event.resource)
        .bind(&event.action)
        .bind(&event.result)
        .bind(&event.description)
        .bind(metadata_json)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store audit event: {e}")))?;

        Ok(())
    }

    /// Most recent audit events, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_recent_audit_events(&self, limit: u32) -> AppResult<Vec<AuditEvent>> {
        let rows = sqlx::query(
            r"
            SELECT event_id, event_type, severity, timestamp, user_id, source_ip,
                   user_agent, resource, action, result, description, metadata
            FROM audit_events
            ORDER BY timestamp DESC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get audit events: {e}")))?;

        rows.iter().map(Self::row_to_audit_event).collect()
    }

    /// Convert a database row to an `AuditEvent`
    fn row_to_audit_event(row: &SqliteRow) -> AppResult<AuditEvent> {
        let event_id: String = row.get("event_id");
        let event_type: String = row.get("event_type");
        let severity: String = row.get("severity");
        let user_id: Option<String> = row.get("user_id");
        let metadata: Option<String> = row.get("metadata");

        Ok(AuditEvent {
            event_id: Uuid::parse_str(&event_id)
                .map_err(|e| AppError::internal(format!("Failed to parse event id: {e}")))?,
            event_type: AuditEventType::from_str_lossy(&event_type),
            severity: AuditSeverity::from_str_lossy(&severity),
            timestamp: row.get("timestamp"),
            user_id: user_id.and_then(|id| Uuid::parse_str(&id).ok()),
            source_ip: row.get("source_ip"),
            user_agent: row.get("user_agent"),
            resource: row.get("resource"),
            action: row.get("action"),
            result: row.get("result"),
            description: row.get("description"),
            metadata: metadata
                .and_then(|m| serde_json::from_str(&m).ok())
                .unwrap_or(serde_json::Value::Null),
        })
    }
}
