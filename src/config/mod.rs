mod settings;

pub use settings::{SchedulerConfig, ServerConfig, Settings};
