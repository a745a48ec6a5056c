//! Notification event catalog.
//!
//! A `NotificationEvent` names a business occurrence and configures which
//! channels fire for it: each channel carries its template reference and
//! retry ceiling together, so a channel is active exactly when its config
//! is present.

mod store;
mod types;

pub use store::{EventStore, MemoryEventStore};
pub use types::{
    ChannelConfig, CreateEventRequest, EventListResponse, NotificationEvent, Priority,
    UpdateEventRequest,
};
