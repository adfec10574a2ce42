//! # Audit Sink
//!
//! Fire-and-forget recording of security-relevant events. The sink is
//! consulted *after* decisions, never for them: a sink failure is swallowed
//! and logged, and can neither block nor alter the outcome of the guarded
//! operation.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::constants::audit;
use crate::models::{AuditLog, NewAuditLog};

/// A security-relevant event worth a trail entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub actor_id: Option<Uuid>,
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: String,
    pub metadata: Option<Value>,
}

impl AuditEvent {
    pub fn new(
        actor_id: Uuid,
        action: &'static str,
        entity_type: &'static str,
        entity_id: impl ToString,
    ) -> Self {
        AuditEvent {
            actor_id: Some(actor_id),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Event for a refused mutation. The only action a denial may ever
    /// produce; successful-write actions are reserved for actual writes.
    pub fn access_denied(actor_id: Uuid, entity_type: &'static str, reason: &str) -> Self {
        AuditEvent {
            actor_id: Some(actor_id),
            action: audit::ACCESS_DENIED,
            entity_type,
            entity_id: String::new(),
            metadata: Some(serde_json::json!({ "reason": reason })),
        }
    }
}

/// Best-effort event recorder. Implementations swallow their own failures;
/// `record` cannot fail from the caller's point of view.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Postgres-backed sink writing to `audit_logs`.
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        PgAuditSink { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, event: AuditEvent) {
        let result = AuditLog::create(
            &self.pool,
            NewAuditLog {
                user_id: event.actor_id,
                action: event.action.to_string(),
                entity_type: event.entity_type.to_string(),
                entity_id: event.entity_id.clone(),
                metadata: event.metadata.clone(),
            },
        )
        .await;

        if let Err(e) = result {
            error!(
                error = %e,
                action = event.action,
                entity_type = event.entity_type,
                "audit log write failed; continuing"
            );
        }
    }
}

/// Discards everything. For tests and tooling that runs without a trail.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn record(&self, _event: AuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_events_carry_the_reason() {
        let event = AuditEvent::access_denied(Uuid::new_v4(), "customer", "not an admin");
        assert_eq!(event.action, audit::ACCESS_DENIED);
        assert_eq!(
            event.metadata,
            Some(serde_json::json!({ "reason": "not an admin" }))
        );
    }

    #[tokio::test]
    async fn null_sink_accepts_anything() {
        NullAuditSink
            .record(AuditEvent::new(
                Uuid::new_v4(),
                audit::TASK_UPDATE,
                "task",
                Uuid::new_v4(),
            ))
            .await;
    }
}
