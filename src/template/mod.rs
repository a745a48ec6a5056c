//! Message templates for outbound notifications.
//!
//! A template is reusable content with `{{variable}}` placeholders plus the
//! declared list of variable names a caller must supply. Rendering is a pure
//! function: it fails closed on the first declared variable missing from the
//! supplied map, before any delivery work happens.

mod render;
mod store;
mod types;

pub use render::{render, RenderError};
pub use store::{MemoryTemplateStore, TemplateStore};
pub use types::{
    CreateTemplateRequest, MessageTemplate, TemplateListResponse, TemplateType,
    UpdateTemplateRequest,
};
