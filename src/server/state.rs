use std::sync::Arc;

use crate::audit::{AuditSink, TracingAuditSink};
use crate::config::Settings;
use crate::dispatch::DispatchService;
use crate::event::{EventStore, MemoryEventStore};
use crate::queue::{MemoryNotificationStore, NotificationStore};
use crate::template::{MemoryTemplateStore, TemplateStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub templates: Arc<dyn TemplateStore>,
    pub events: Arc<dyn EventStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub dispatch: Arc<DispatchService>,
}

impl AppState {
    /// State wired with the in-memory stores and the tracing audit sink.
    pub fn new(settings: Settings) -> Self {
        Self::with_stores(
            settings,
            Arc::new(MemoryTemplateStore::new()),
            Arc::new(MemoryEventStore::new()),
            Arc::new(MemoryNotificationStore::new()),
            Arc::new(TracingAuditSink),
        )
    }

    pub fn with_stores(
        settings: Settings,
        templates: Arc<dyn TemplateStore>,
        events: Arc<dyn EventStore>,
        notifications: Arc<dyn NotificationStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let dispatch = Arc::new(DispatchService::new(
            templates.clone(),
            events.clone(),
            notifications.clone(),
            audit,
        ));

        Self {
            settings: Arc::new(settings),
            templates,
            events,
            notifications,
            dispatch,
        }
    }
}
