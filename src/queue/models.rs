//! Queue row model and per-channel delivery state machine

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{NotificationEvent, Priority};

/// Delivery status of one channel of one queued notification.
///
/// `Sent` and `Failed` are absorbing: once reached, the scheduler never
/// touches the channel again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

/// Per-channel delivery state: status plus accumulated failure count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    pub status: DeliveryStatus,
    pub fail_count: u32,
}

impl ChannelState {
    /// Fresh state for a newly queued active channel.
    pub fn pending() -> Self {
        Self {
            status: DeliveryStatus::Pending,
            fail_count: 0,
        }
    }

    /// Record one successful delivery attempt.
    pub fn record_success(&mut self) {
        self.status = DeliveryStatus::Sent;
    }

    /// Record one failed delivery attempt against the channel's retry
    /// ceiling. Reaching the ceiling exactly is what terminates the channel.
    pub fn record_failure(&mut self, max_retries: u32) {
        self.fail_count += 1;
        if self.fail_count >= max_retries {
            self.status = DeliveryStatus::Failed;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == DeliveryStatus::Pending
    }
}

/// One queued instance of a triggered event.
///
/// Created once by the dispatch service; mutated only by the schedulers,
/// one channel at a time; never deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier
    pub id: Uuid,

    /// The catalog event this row was triggered from
    pub event_id: Uuid,

    /// Priority tier, captured from the event at trigger time
    pub priority: Priority,

    /// Email delivery state; `None` when email is inactive for the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<ChannelState>,

    /// SMS delivery state; `None` when SMS is inactive for the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<ChannelState>,

    /// Creation instant, the FIFO ordering key within a tier
    pub created_at: DateTime<Utc>,

    /// Variable map supplied by the trigger
    #[serde(default)]
    pub variables: HashMap<String, String>,

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

    /// Recipient identifiers, kept for correlation only
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl Notification {
    /// Build a fresh queue row for the given event.
    ///
    /// Each active channel is seeded `Pending` with a zero fail count;
    /// inactive channels stay `None` and are never touched again.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event: &NotificationEvent,
        variables: HashMap<String, String>,
        recipients: Vec<String>,
        to_email: Vec<String>,
        cc_email: Vec<String>,
        bcc_email: Vec<String>,
        phone_numbers: Vec<String>,
        attachments: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id: event.id,
            priority: event.priority,
            email: event.email.map(|_| ChannelState::pending()),
            sms: event.sms.map(|_| ChannelState::pending()),
            created_at: Utc::now(),
            variables,
            to_email,
            cc_email,
            bcc_email,
            phone_numbers,
            attachments,
            recipients,
        }
    }

    /// Whether any channel is still awaiting delivery.
    pub fn has_pending_channel(&self) -> bool {
        self.email.map_or(false, |c| c.is_pending()) || self.sms.map_or(false, |c| c.is_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChannelConfig, CreateEventRequest};

    fn event(email: bool, sms: bool) -> NotificationEvent {
        CreateEventRequest {
            name: "visit.reminder".to_string(),
            description: String::new(),
            email: email.then(|| ChannelConfig {
                template_id: Uuid::new_v4(),
                max_retries: 4,
            }),
            sms: sms.then(|| ChannelConfig {
                template_id: Uuid::new_v4(),
                max_retries: 4,
            }),
            priority: Priority::Medium,
            parameters: vec![],
        }
        .into()
    }

    fn row(email: bool, sms: bool) -> Notification {
        Notification::new(
            &event(email, sms),
            HashMap::new(),
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_new_row_seeds_only_active_channels() {
        let row = row(true, false);
        assert_eq!(row.email, Some(ChannelState::pending()));
        assert!(row.sms.is_none());
        assert_eq!(row.priority, Priority::Medium);
    }

    #[test]
    fn test_success_is_terminal() {
        let mut state = ChannelState::pending();
        state.record_success();
        assert_eq!(state.status, DeliveryStatus::Sent);
        assert_eq!(state.fail_count, 0);
    }

    #[test]
    fn test_failure_below_ceiling_stays_pending() {
        let mut state = ChannelState {
            status: DeliveryStatus::Pending,
            fail_count: 2,
        };
        state.record_failure(4);
        assert_eq!(state.fail_count, 3);
        assert_eq!(state.status, DeliveryStatus::Pending);
    }

    #[test]
    fn test_failure_reaching_ceiling_terminates() {
        let mut state = ChannelState {
            status: DeliveryStatus::Pending,
            fail_count: 3,
        };
        state.record_failure(4);
        // Ceiling is reached, not exceeded, at the terminal transition.
        assert_eq!(state.fail_count, 4);
        assert_eq!(state.status, DeliveryStatus::Failed);
    }

    #[test]
    fn test_zero_ceiling_fails_on_first_attempt() {
        let mut state = ChannelState::pending();
        state.record_failure(0);
        assert_eq!(state.status, DeliveryStatus::Failed);
        assert_eq!(state.fail_count, 1);
    }

    #[test]
    fn test_has_pending_channel() {
        let mut row = row(true, true);
        assert!(row.has_pending_channel());

        row.email.as_mut().unwrap().record_success();
        assert!(row.has_pending_channel());

        row.sms.as_mut().unwrap().record_failure(1);
        assert!(!row.has_pending_channel());
    }
}
