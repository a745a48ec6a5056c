// Infrastructure layer (shared components)
pub mod config;
pub mod error;

// Domain layer (business logic)
pub mod audit;
pub mod channel;
pub mod dispatch;
pub mod event;
pub mod queue;
pub mod template;

// Application layer
pub mod api;
pub mod scheduler;
pub mod server;
