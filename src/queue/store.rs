//! Notification queue storage

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::StoreError;
use crate::event::Priority;

use super::models::Notification;

/// Keyed repository for queued notifications.
///
/// Beyond get/upsert, the queue needs exactly two compound queries: the
/// pending rows of one tier for one channel, FIFO by creation instant.
/// These are the only shapes the schedulers use.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Get a notification by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Notification>, StoreError>;

    /// Insert or replace a notification row.
    async fn upsert(&self, notification: Notification) -> Result<(), StoreError>;

    /// Rows of the tier whose SMS channel is pending, oldest first.
    async fn pending_sms(&self, tier: Priority) -> Result<Vec<Notification>, StoreError>;

    /// Rows of the tier whose email channel is pending, oldest first.
    async fn pending_email(&self, tier: Priority) -> Result<Vec<Notification>, StoreError>;

    /// Whether any row with a still-pending channel references the event.
    /// Backs the referenced-delete guard.
    async fn has_pending_for_event(&self, event_id: Uuid) -> Result<bool, StoreError>;
}

/// In-memory notification store backed by `DashMap`.
pub struct MemoryNotificationStore {
    rows: DashMap<Uuid, Notification>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    fn collect_sorted<F>(&self, filter: F) -> Vec<Notification>
    where
        F: Fn(&Notification) -> bool,
    {
        let mut rows: Vec<Notification> = self
            .rows
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|r| r.created_at);
        rows
    }
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn get(&self, id: Uuid) -> Result<Option<Notification>, StoreError> {
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }

    async fn upsert(&self, notification: Notification) -> Result<(), StoreError> {
        self.rows.insert(notification.id, notification);
        Ok(())
    }

    async fn pending_sms(&self, tier: Priority) -> Result<Vec<Notification>, StoreError> {
        Ok(self.collect_sorted(|r| {
            r.priority == tier && r.sms.map_or(false, |c| c.is_pending())
        }))
    }

    async fn pending_email(&self, tier: Priority) -> Result<Vec<Notification>, StoreError> {
        Ok(self.collect_sorted(|r| {
            r.priority == tier && r.email.map_or(false, |c| c.is_pending())
        }))
    }

    async fn has_pending_for_event(&self, event_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .rows
            .iter()
            .any(|entry| entry.event_id == event_id && entry.has_pending_channel()))
    }
}
