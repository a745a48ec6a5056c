use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::channel::{EmailSender, OutboundEmail, SmsSender};
use crate::event::{ChannelConfig, EventStore, NotificationEvent, Priority};
use crate::queue::{Notification, NotificationStore};
use crate::template::{render, TemplateStore};

/// Background driver delivering the pending rows of one priority tier.
///
/// Each run polls the tier's pending SMS rows and then its pending email
/// rows, oldest first, attempting exactly one delivery per row per run.
/// Rows are persisted immediately after every attempt; a failure on one
/// row never aborts the rest of the batch.
pub struct DeliveryScheduler {
    tier: Priority,
    interval: Duration,
    events: Arc<dyn EventStore>,
    templates: Arc<dyn TemplateStore>,
    notifications: Arc<dyn NotificationStore>,
    email_sender: Arc<dyn EmailSender>,
    sms_sender: Arc<dyn SmsSender>,
    shutdown: broadcast::Receiver<()>,
}

impl DeliveryScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tier: Priority,
        interval: Duration,
        events: Arc<dyn EventStore>,
        templates: Arc<dyn TemplateStore>,
        notifications: Arc<dyn NotificationStore>,
        email_sender: Arc<dyn EmailSender>,
        sms_sender: Arc<dyn SmsSender>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            tier,
            interval,
            events,
            templates,
            notifications,
            email_sender,
            sms_sender,
            shutdown,
        }
    }

    /// Run the fixed-interval polling loop until shutdown.
    pub async fn run(mut self) {
        let mut timer = tokio::time::interval(self.interval);

        // Skip immediate first tick
        timer.tick().await;

        tracing::info!(
            tier = %self.tier,
            interval_secs = self.interval.as_secs(),
            "Delivery scheduler started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!(tier = %self.tier, "Delivery scheduler received shutdown signal");
                    break;
                }
                _ = timer.tick() => {
                    self.run_once().await;
                }
            }
        }

        tracing::info!(tier = %self.tier, "Delivery scheduler stopped");
    }

    /// One polling pass: the tier's pending SMS rows, then its pending
    /// email rows. The two passes are independent; a row active on both
    /// channels appears in both and its channel fields update separately.
    pub async fn run_once(&self) {
        match self.notifications.pending_sms(self.tier).await {
            Ok(rows) => {
                for row in rows {
                    self.attempt_sms(row).await;
                }
            }
            Err(e) => {
                tracing::warn!(tier = %self.tier, error = %e, "Failed to fetch pending SMS rows");
            }
        }

        match self.notifications.pending_email(self.tier).await {
            Ok(rows) => {
                for row in rows {
                    self.attempt_email(row).await;
                }
            }
            Err(e) => {
                tracing::warn!(tier = %self.tier, error = %e, "Failed to fetch pending email rows");
            }
        }
    }

    async fn attempt_sms(&self, mut row: Notification) {
        let Some((event, config)) = self.channel_config(&row, |e| e.sms).await else {
            return;
        };

        let outcome = match self.rendered_content(&config, &row).await {
            Some(text) => self
                .sms_sender
                .send(&row.phone_numbers, &text, &row.attachments)
                .await
                .map_err(|e| e.to_string()),
            // A template that no longer renders counts as a failed attempt
            None => Err("template unavailable or failed to render".to_string()),
        };

        let Some(state) = row.sms.as_mut() else {
            return;
        };

        match outcome {
            Ok(()) => {
                state.record_success();
                tracing::info!(
                    notification_id = %row.id,
                    event_name = %event.name,
                    tier = %self.tier,
                    "SMS delivered"
                );
            }
            Err(reason) => {
                state.record_failure(config.max_retries);
                tracing::warn!(
                    notification_id = %row.id,
                    event_name = %event.name,
                    tier = %self.tier,
                    fail_count = state.fail_count,
                    max_retries = config.max_retries,
                    status = ?state.status,
                    reason = %reason,
                    "SMS delivery attempt failed"
                );
            }
        }

        self.persist(row).await;
    }

    async fn attempt_email(&self, mut row: Notification) {
        let Some((event, config)) = self.channel_config(&row, |e| e.email).await else {
            return;
        };

        let outcome = match self.rendered_content(&config, &row).await {
            Some(body) => {
                let email = OutboundEmail {
                    to: row.to_email.clone(),
                    cc: row.cc_email.clone(),
                    bcc: row.bcc_email.clone(),
                    subject: event.name.clone(),
                    body,
                    attachments: row.attachments.clone(),
                };
                self.email_sender
                    .send(&email)
                    .await
                    .map_err(|e| e.to_string())
            }
            None => Err("template unavailable or failed to render".to_string()),
        };

        let Some(state) = row.email.as_mut() else {
            return;
        };

        match outcome {
            Ok(()) => {
                state.record_success();
                tracing::info!(
                    notification_id = %row.id,
                    event_name = %event.name,
                    tier = %self.tier,
                    "Email delivered"
                );
            }
            Err(reason) => {
                state.record_failure(config.max_retries);
                tracing::warn!(
                    notification_id = %row.id,
                    event_name = %event.name,
                    tier = %self.tier,
                    fail_count = state.fail_count,
                    max_retries = config.max_retries,
                    status = ?state.status,
                    reason = %reason,
                    "Email delivery attempt failed"
                );
            }
        }

        self.persist(row).await;
    }

    /// Resolve the row's parent event and the channel's config.
    ///
    /// A missing event or channel config means the catalog was mutated
    /// underneath the queue (the delete guards prevent this in normal
    /// operation); the row is left untouched for investigation.
    async fn channel_config<F>(
        &self,
        row: &Notification,
        select: F,
    ) -> Option<(NotificationEvent, ChannelConfig)>
    where
        F: Fn(&NotificationEvent) -> Option<ChannelConfig>,
    {
        let event = match self.events.get(row.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::warn!(
                    notification_id = %row.id,
                    event_id = %row.event_id,
                    "Queued notification references a missing event, skipping"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(notification_id = %row.id, error = %e, "Event lookup failed");
                return None;
            }
        };

        match select(&event) {
            Some(config) => Some((event, config)),
            None => {
                tracing::warn!(
                    notification_id = %row.id,
                    event_id = %row.event_id,
                    "Queued channel has no configuration on its event, skipping"
                );
                None
            }
        }
    }

    /// Resolve and render the channel's template. `None` means the attempt
    /// must be counted as a delivery failure.
    async fn rendered_content(
        &self,
        config: &ChannelConfig,
        row: &Notification,
    ) -> Option<String> {
        let template = match self.templates.get(config.template_id).await {
            Ok(Some(template)) => template,
            Ok(None) => {
                tracing::warn!(
                    notification_id = %row.id,
                    template_id = %config.template_id,
                    "Template missing at delivery time"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(notification_id = %row.id, error = %e, "Template lookup failed");
                return None;
            }
        };

        match render(
            &template.name,
            &template.content,
            &template.variables,
            &row.variables,
        ) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(notification_id = %row.id, error = %e, "Template render failed at delivery time");
                None
            }
        }
    }

    /// Persist the row immediately after the attempt, never batched: a
    /// crash mid-run loses at most the in-flight attempt.
    async fn persist(&self, row: Notification) {
        let id = row.id;
        if let Err(e) = self.notifications.upsert(row).await {
            tracing::warn!(notification_id = %id, error = %e, "Failed to persist delivery attempt");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::channel::SendError;
    use crate::event::{CreateEventRequest, MemoryEventStore, Priority};
    use crate::queue::{DeliveryStatus, MemoryNotificationStore};
    use crate::template::{CreateTemplateRequest, MemoryTemplateStore, TemplateType};

    /// Sender whose outcomes are scripted in advance; records every call.
    struct ScriptedSender {
        outcomes: Mutex<Vec<Result<(), SendError>>>,
        calls: AtomicUsize,
        last_message: Mutex<Option<String>>,
    }

    impl ScriptedSender {
        fn new(outcomes: Vec<Result<(), SendError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicUsize::new(0),
                last_message: Mutex::new(None),
            })
        }

        fn always_ok() -> Arc<Self> {
            Self::new(vec![])
        }

        fn next_outcome(&self) -> Result<(), SendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                Ok(())
            } else {
                outcomes.remove(0)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SmsSender for ScriptedSender {
        async fn send(
            &self,
            _phone_numbers: &[String],
            message: &str,
            _attachments: &[String],
        ) -> Result<(), SendError> {
            *self.last_message.lock().unwrap() = Some(message.to_string());
            self.next_outcome()
        }
    }

    #[async_trait]
    impl EmailSender for ScriptedSender {
        async fn send(&self, email: &OutboundEmail) -> Result<(), SendError> {
            *self.last_message.lock().unwrap() = Some(email.body.clone());
            self.next_outcome()
        }
    }

    struct Fixture {
        events: Arc<MemoryEventStore>,
        templates: Arc<MemoryTemplateStore>,
        notifications: Arc<MemoryNotificationStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                events: Arc::new(MemoryEventStore::new()),
                templates: Arc::new(MemoryTemplateStore::new()),
                notifications: Arc::new(MemoryNotificationStore::new()),
            }
        }

        fn scheduler(
            &self,
            tier: Priority,
            email_sender: Arc<ScriptedSender>,
            sms_sender: Arc<ScriptedSender>,
        ) -> DeliveryScheduler {
            let (_tx, rx) = broadcast::channel(1);
            DeliveryScheduler::new(
                tier,
                Duration::from_secs(60),
                self.events.clone(),
                self.templates.clone(),
                self.notifications.clone(),
                email_sender,
                sms_sender,
                rx,
            )
        }

        async fn template(&self, template_type: TemplateType) -> Uuid {
            let template = CreateTemplateRequest {
                name: "reminder".to_string(),
                content: "Hello {{firstName}}".to_string(),
                variables: vec!["firstName".to_string()],
            }
            .into_template(template_type);
            let id = template.id;
            self.templates.upsert(template).await.unwrap();
            id
        }

        async fn queued_row(
            &self,
            tier: Priority,
            email_retries: Option<u32>,
            sms_retries: Option<u32>,
        ) -> Uuid {
            let email_template = self.template(TemplateType::Email).await;
            let sms_template = self.template(TemplateType::Sms).await;

            let event: NotificationEvent = CreateEventRequest {
                name: "visit.reminder".to_string(),
                description: String::new(),
                email: email_retries.map(|max_retries| ChannelConfig {
                    template_id: email_template,
                    max_retries,
                }),
                sms: sms_retries.map(|max_retries| ChannelConfig {
                    template_id: sms_template,
                    max_retries,
                }),
                priority: tier,
                parameters: vec![],
            }
            .into();
            self.events.upsert(event.clone()).await.unwrap();

            let row = Notification::new(
                &event,
                HashMap::from([("firstName".to_string(), "Ana".to_string())]),
                vec![],
                vec!["pat@example.org".to_string()],
                vec![],
                vec![],
                vec!["+15550100".to_string()],
                vec![],
            );
            let id = row.id;
            self.notifications.upsert(row).await.unwrap();
            id
        }
    }

    #[tokio::test]
    async fn test_successful_delivery_marks_sent() {
        let fx = Fixture::new();
        let id = fx.queued_row(Priority::High, None, Some(4)).await;

        let sms = ScriptedSender::always_ok();
        fx.scheduler(Priority::High, ScriptedSender::always_ok(), sms.clone())
            .run_once()
            .await;

        let row = fx.notifications.get(id).await.unwrap().unwrap();
        let state = row.sms.unwrap();
        assert_eq!(state.status, DeliveryStatus::Sent);
        assert_eq!(state.fail_count, 0);
        assert_eq!(sms.calls(), 1);
        assert_eq!(
            sms.last_message.lock().unwrap().as_deref(),
            Some("Hello Ana")
        );
    }

    #[tokio::test]
    async fn test_failure_below_ceiling_retries_next_run() {
        let fx = Fixture::new();
        let id = fx.queued_row(Priority::Medium, None, Some(4)).await;

        // Seed the row at two prior failures
        let mut row = fx.notifications.get(id).await.unwrap().unwrap();
        row.sms.as_mut().unwrap().fail_count = 2;
        fx.notifications.upsert(row).await.unwrap();

        let sms = ScriptedSender::new(vec![Err(SendError::Transport("gateway down".into()))]);
        fx.scheduler(Priority::Medium, ScriptedSender::always_ok(), sms)
            .run_once()
            .await;

        let state = fx.notifications.get(id).await.unwrap().unwrap().sms.unwrap();
        assert_eq!(state.fail_count, 3);
        assert_eq!(state.status, DeliveryStatus::Pending);
    }

    #[tokio::test]
    async fn test_failure_reaching_ceiling_marks_failed() {
        let fx = Fixture::new();
        let id = fx.queued_row(Priority::Medium, None, Some(4)).await;

        let mut row = fx.notifications.get(id).await.unwrap().unwrap();
        row.sms.as_mut().unwrap().fail_count = 3;
        fx.notifications.upsert(row).await.unwrap();

        let sms = ScriptedSender::new(vec![Err(SendError::Transport("gateway down".into()))]);
        fx.scheduler(Priority::Medium, ScriptedSender::always_ok(), sms)
            .run_once()
            .await;

        let state = fx.notifications.get(id).await.unwrap().unwrap().sms.unwrap();
        assert_eq!(state.fail_count, 4);
        assert_eq!(state.status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn test_terminal_rows_are_never_reattempted() {
        let fx = Fixture::new();
        let id = fx.queued_row(Priority::High, None, Some(1)).await;

        let sms = ScriptedSender::new(vec![Err(SendError::Rejected("bad number".into()))]);
        let scheduler = fx.scheduler(Priority::High, ScriptedSender::always_ok(), sms.clone());

        scheduler.run_once().await;
        let state = fx.notifications.get(id).await.unwrap().unwrap().sms.unwrap();
        assert_eq!(state.status, DeliveryStatus::Failed);
        assert_eq!(sms.calls(), 1);

        // Further runs must not touch the absorbed row
        scheduler.run_once().await;
        scheduler.run_once().await;
        assert_eq!(sms.calls(), 1);
    }

    #[tokio::test]
    async fn test_channels_update_independently() {
        let fx = Fixture::new();
        let id = fx.queued_row(Priority::High, Some(3), Some(3)).await;

        let email = ScriptedSender::new(vec![Err(SendError::Transport("smtp down".into()))]);
        let sms = ScriptedSender::always_ok();
        fx.scheduler(Priority::High, email, sms)
            .run_once()
            .await;

        let row = fx.notifications.get(id).await.unwrap().unwrap();
        assert_eq!(row.sms.unwrap().status, DeliveryStatus::Sent);
        let email_state = row.email.unwrap();
        assert_eq!(email_state.status, DeliveryStatus::Pending);
        assert_eq!(email_state.fail_count, 1);
    }

    #[tokio::test]
    async fn test_one_row_failure_does_not_abort_batch() {
        let fx = Fixture::new();
        let first = fx.queued_row(Priority::Low, None, Some(5)).await;
        // Distinct creation instants keep the FIFO order unambiguous
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = fx.queued_row(Priority::Low, None, Some(5)).await;

        let sms = ScriptedSender::new(vec![
            Err(SendError::Transport("gateway down".into())),
            Ok(()),
        ]);
        fx.scheduler(Priority::Low, ScriptedSender::always_ok(), sms.clone())
            .run_once()
            .await;

        assert_eq!(sms.calls(), 2);
        let first_state = fx.notifications.get(first).await.unwrap().unwrap().sms.unwrap();
        let second_state = fx.notifications.get(second).await.unwrap().unwrap().sms.unwrap();
        assert_eq!(first_state.status, DeliveryStatus::Pending);
        assert_eq!(second_state.status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn test_scheduler_ignores_other_tiers() {
        let fx = Fixture::new();
        let low = fx.queued_row(Priority::Low, None, Some(3)).await;

        let sms = ScriptedSender::always_ok();
        fx.scheduler(Priority::High, ScriptedSender::always_ok(), sms.clone())
            .run_once()
            .await;

        assert_eq!(sms.calls(), 0);
        let state = fx.notifications.get(low).await.unwrap().unwrap().sms.unwrap();
        assert_eq!(state.status, DeliveryStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_template_counts_as_delivery_failure() {
        let fx = Fixture::new();
        let id = fx.queued_row(Priority::High, None, Some(2)).await;

        // Remove the template underneath the queue
        let event_id = fx.notifications.get(id).await.unwrap().unwrap().event_id;
        let event = fx.events.get(event_id).await.unwrap().unwrap();
        fx.templates
            .remove(event.sms.unwrap().template_id)
            .await
            .unwrap();

        let sms = ScriptedSender::always_ok();
        fx.scheduler(Priority::High, ScriptedSender::always_ok(), sms.clone())
            .run_once()
            .await;

        // The sender was never reached, but the attempt still counted
        assert_eq!(sms.calls(), 0);
        let state = fx.notifications.get(id).await.unwrap().unwrap().sms.unwrap();
        assert_eq!(state.fail_count, 1);
        assert_eq!(state.status, DeliveryStatus::Pending);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let fx = Fixture::new();
        let (tx, rx) = broadcast::channel(1);
        let scheduler = DeliveryScheduler::new(
            Priority::High,
            Duration::from_secs(3600),
            fx.events.clone(),
            fx.templates.clone(),
            fx.notifications.clone(),
            ScriptedSender::always_ok(),
            ScriptedSender::always_ok(),
            rx,
        );

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler should stop")
            .expect("scheduler should not panic");
    }
}
