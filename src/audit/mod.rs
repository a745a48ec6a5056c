//! Fire-and-forget audit sink for queue mutations.
//!
//! The platform's request-lifecycle auditing lives outside this subsystem;
//! this sink only records that a notification row was queued. A
//! serialization failure here aborts the whole send before anything is
//! persisted, which the API surfaces as `NotAcceptable`.

use async_trait::async_trait;
use thiserror::Error;

use crate::queue::Notification;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to serialize audit record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Consumer of queue-creation audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record that a notification row is about to be queued.
    async fn notification_queued(&self, notification: &Notification) -> Result<(), AuditError>;
}

/// Audit sink that emits the serialized row through tracing.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn notification_queued(&self, notification: &Notification) -> Result<(), AuditError> {
        let record = serde_json::to_string(notification)?;
        tracing::info!(
            notification_id = %notification.id,
            event_id = %notification.event_id,
            record = %record,
            "Notification queued"
        );
        Ok(())
    }
}
