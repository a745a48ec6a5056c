//! Template storage

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::StoreError;

use super::types::{MessageTemplate, TemplateType};

/// Keyed repository for message templates.
///
/// Implementations must be thread-safe (`Send + Sync`); they are shared
/// across the HTTP handlers, the dispatch service and the schedulers.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Get a template by ID.
    async fn get(&self, id: Uuid) -> Result<Option<MessageTemplate>, StoreError>;

    /// Insert or replace a template.
    async fn upsert(&self, template: MessageTemplate) -> Result<(), StoreError>;

    /// Remove a template, returning it if it existed.
    async fn remove(&self, id: Uuid) -> Result<Option<MessageTemplate>, StoreError>;

    /// List templates, optionally restricted to one channel.
    async fn list(
        &self,
        template_type: Option<TemplateType>,
    ) -> Result<Vec<MessageTemplate>, StoreError>;
}

/// In-memory template store backed by `DashMap`.
pub struct MemoryTemplateStore {
    templates: DashMap<Uuid, MessageTemplate>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }
}

impl Default for MemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn get(&self, id: Uuid) -> Result<Option<MessageTemplate>, StoreError> {
        Ok(self.templates.get(&id).map(|t| t.clone()))
    }

    async fn upsert(&self, template: MessageTemplate) -> Result<(), StoreError> {
        self.templates.insert(template.id, template);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<Option<MessageTemplate>, StoreError> {
        Ok(self.templates.remove(&id).map(|(_, t)| t))
    }

    async fn list(
        &self,
        template_type: Option<TemplateType>,
    ) -> Result<Vec<MessageTemplate>, StoreError> {
        let mut templates: Vec<MessageTemplate> = self
            .templates
            .iter()
            .filter(|entry| template_type.map_or(true, |t| entry.template_type == t))
            .map(|entry| entry.value().clone())
            .collect();

        templates.sort_by_key(|t| t.created_at);
        Ok(templates)
    }
}
