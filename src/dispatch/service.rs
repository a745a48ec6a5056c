use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::audit::AuditSink;
use crate::error::AppError;
use crate::event::{ChannelConfig, EventStore, NotificationEvent};
use crate::queue::{Notification, NotificationStore};
use crate::template::{render, MessageTemplate, TemplateStore};

/// Inbound trigger for a catalog event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    /// The catalog event to trigger
    pub event_id: Uuid,

    /// Values for the templates' declared variables
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Recipient identifiers, kept for correlation only
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Email address lists
    #[serde(default)]
    pub to_email: Vec<String>,
    #[serde(default)]
    pub cc_email: Vec<String>,
    #[serde(default)]
    pub bcc_email: Vec<String>,

    /// SMS destinations
    #[serde(default)]
    pub phone_numbers: Vec<String>,

    /// Attachment references
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Validates triggers and enqueues notification rows.
pub struct DispatchService {
    templates: Arc<dyn TemplateStore>,
    events: Arc<dyn EventStore>,
    notifications: Arc<dyn NotificationStore>,
    audit: Arc<dyn AuditSink>,
}

impl DispatchService {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        events: Arc<dyn EventStore>,
        notifications: Arc<dyn NotificationStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            templates,
            events,
            notifications,
            audit,
        }
    }

    /// Validate a trigger and enqueue one notification row.
    ///
    /// Every active channel's template must resolve and render with the
    /// supplied variables before anything is persisted; any failure aborts
    /// the whole send with no partial row left behind. Delivery itself
    /// happens later, in the schedulers.
    pub async fn send_notification(
        &self,
        request: SendNotificationRequest,
    ) -> Result<Uuid, AppError> {
        let event = self.require_event(request.event_id).await?;

        if let Some(config) = &event.email {
            let template = self.require_template(config, &event).await?;
            render(
                &template.name,
                &template.content,
                &template.variables,
                &request.variables,
            )?;
        }

        if let Some(config) = &event.sms {
            let template = self.require_template(config, &event).await?;
            render(
                &template.name,
                &template.content,
                &template.variables,
                &request.variables,
            )?;
        }

        let notification = Notification::new(
            &event,
            request.variables,
            request.recipients,
            request.to_email,
            request.cc_email,
            request.bcc_email,
            request.phone_numbers,
            request.attachments,
        );
        let id = notification.id;

        // Audit before persisting: a serialization failure aborts the send
        // with nothing queued.
        self.audit.notification_queued(&notification).await?;
        self.notifications.upsert(notification).await?;

        tracing::info!(
            notification_id = %id,
            event_id = %event.id,
            event_name = %event.name,
            priority = %event.priority,
            "Notification enqueued"
        );

        Ok(id)
    }

    /// Delete a template unless a still-pending notification depends on it.
    pub async fn delete_template(&self, template_id: Uuid) -> Result<(), AppError> {
        if self.templates.get(template_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Template {template_id}")));
        }

        for event in self.events.list().await? {
            if event.uses_template(template_id)
                && self.notifications.has_pending_for_event(event.id).await?
            {
                return Err(AppError::FailedPrecondition(format!(
                    "Template {template_id} is still referenced by queued notifications of event '{}'",
                    event.name
                )));
            }
        }

        self.templates.remove(template_id).await?;
        Ok(())
    }

    /// Delete an event unless a still-pending notification references it.
    pub async fn delete_event(&self, event_id: Uuid) -> Result<(), AppError> {
        if self.events.get(event_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Event {event_id}")));
        }

        if self.notifications.has_pending_for_event(event_id).await? {
            return Err(AppError::FailedPrecondition(format!(
                "Event {event_id} is still referenced by queued notifications"
            )));
        }

        self.events.remove(event_id).await?;
        Ok(())
    }

    async fn require_event(&self, id: Uuid) -> Result<NotificationEvent, AppError> {
        self.events
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {id}")))
    }

    async fn require_template(
        &self,
        config: &ChannelConfig,
        event: &NotificationEvent,
    ) -> Result<MessageTemplate, AppError> {
        self.templates.get(config.template_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "Template {} configured on event '{}'",
                config.template_id, event.name
            ))
        })
    }
}
