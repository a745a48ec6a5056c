//! Event catalog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Priority tier of an event.
///
/// Selects which scheduler delivers the event's notifications and how often
/// it polls. The legacy wire value `IMMEDIATE` is accepted as `HIGH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[serde(alias = "IMMEDIATE")]
    High,
    Medium,
    Low,
}

impl Priority {
    /// All tiers, one scheduler each.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// Per-channel configuration on an event.
///
/// Presence of this value is what makes the channel active; the retry
/// ceiling travels with it and has no meaning for an inactive channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Template rendered for this channel
    pub template_id: Uuid,

    /// Delivery attempts before the channel is marked failed
    pub max_retries: u32,
}

/// A catalog entry describing one triggerable notification event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique event identifier
    pub id: Uuid,

    /// Event name (also used as the email subject line)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Email channel configuration; `None` means email never fires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<ChannelConfig>,

    /// SMS channel configuration; `None` means SMS never fires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<ChannelConfig>,

    /// Priority tier
    pub priority: Priority,

    /// Informational list of expected trigger parameters
    #[serde(default)]
    pub parameters: Vec<String>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Validate the event fields
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() || self.name.len() > 256 {
            return Err(AppError::Validation(
                "Event name must be 1-256 characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the given template is referenced by either channel
    pub fn uses_template(&self, template_id: Uuid) -> bool {
        self.email.map_or(false, |c| c.template_id == template_id)
            || self.sms.map_or(false, |c| c.template_id == template_id)
    }
}

/// Request to create a new event
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    /// Event name
    pub name: String,

    /// Human-readable description (optional)
    #[serde(default)]
    pub description: String,

    /// Email channel configuration (optional)
    pub email: Option<ChannelConfig>,

    /// SMS channel configuration (optional)
    pub sms: Option<ChannelConfig>,

    /// Priority tier
    pub priority: Priority,

    /// Informational parameter list (optional)
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl From<CreateEventRequest> for NotificationEvent {
    fn from(req: CreateEventRequest) -> Self {
        let now = Utc::now();
        NotificationEvent {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            email: req.email,
            sms: req.sms,
            priority: req.priority,
            parameters: req.parameters,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to update an existing event
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    /// Event name (optional)
    pub name: Option<String>,

    /// Description (optional)
    pub description: Option<String>,

    /// Email channel configuration (optional, use null to deactivate)
    pub email: Option<Option<ChannelConfig>>,

    /// SMS channel configuration (optional, use null to deactivate)
    pub sms: Option<Option<ChannelConfig>>,

    /// Priority tier (optional)
    pub priority: Option<Priority>,

    /// Informational parameter list (optional)
    pub parameters: Option<Vec<String>>,
}

/// Response for listing events
#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<NotificationEvent>,
    pub total: usize,
}
