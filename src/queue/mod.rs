//! Durable notification queue.
//!
//! One `Notification` row per triggered event occurrence. Each active
//! channel carries its own status and fail count; the two channels advance
//! through the delivery state machine independently.

mod models;
mod store;

pub use models::{ChannelState, DeliveryStatus, Notification};
pub use store::{MemoryNotificationStore, NotificationStore};
