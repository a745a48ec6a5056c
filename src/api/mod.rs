//! HTTP handlers for the communications surface.

mod event;
mod health;
mod notification;
mod routes;
mod template;

pub use routes::api_routes;
