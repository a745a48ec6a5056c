//! Event catalog storage

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::StoreError;

use super::types::NotificationEvent;

/// Keyed repository for the event catalog.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Get an event by ID.
    async fn get(&self, id: Uuid) -> Result<Option<NotificationEvent>, StoreError>;

    /// Insert or replace an event.
    async fn upsert(&self, event: NotificationEvent) -> Result<(), StoreError>;

    /// Remove an event, returning it if it existed.
    async fn remove(&self, id: Uuid) -> Result<Option<NotificationEvent>, StoreError>;

    /// List all events.
    async fn list(&self) -> Result<Vec<NotificationEvent>, StoreError>;
}

/// In-memory event store backed by `DashMap`.
pub struct MemoryEventStore {
    events: DashMap<Uuid, NotificationEvent>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
        }
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn get(&self, id: Uuid) -> Result<Option<NotificationEvent>, StoreError> {
        Ok(self.events.get(&id).map(|e| e.clone()))
    }

    async fn upsert(&self, event: NotificationEvent) -> Result<(), StoreError> {
        self.events.insert(event.id, event);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<Option<NotificationEvent>, StoreError> {
        Ok(self.events.remove(&id).map(|(_, e)| e))
    }

    async fn list(&self) -> Result<Vec<NotificationEvent>, StoreError> {
        let mut events: Vec<NotificationEvent> =
            self.events.iter().map(|entry| entry.value().clone()).collect();
        events.sort_by_key(|e| e.created_at);
        Ok(events)
    }
}
