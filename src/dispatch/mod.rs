//! Notification dispatch service.
//!
//! Validates a trigger against the event catalog, renders every active
//! channel's template, and enqueues exactly one `Notification` row. Also
//! owns the referenced-delete guards for templates and events.

mod service;

pub use service::{DispatchService, SendNotificationRequest};
