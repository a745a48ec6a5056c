use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::event::Priority;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Poll intervals for the three priority-tier delivery schedulers.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// High-tier poll interval in seconds
    #[serde(default = "default_high_interval")]
    pub high_interval: u64,
    /// Medium-tier poll interval in seconds
    #[serde(default = "default_medium_interval")]
    pub medium_interval: u64,
    /// Low-tier poll interval in seconds
    #[serde(default = "default_low_interval")]
    pub low_interval: u64,
}

fn default_high_interval() -> u64 {
    10
}

fn default_medium_interval() -> u64 {
    30
}

fn default_low_interval() -> u64 {
    60
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("scheduler.high_interval", 10)?
            .set_default("scheduler.medium_interval", 30)?
            .set_default("scheduler.low_interval", 60)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER_HOST, SERVER_PORT, SCHEDULER_HIGH_INTERVAL, etc.
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true)
                    .list_separator(","),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl SchedulerConfig {
    /// Poll interval for the scheduler bound to the given tier.
    pub fn interval_for(&self, tier: Priority) -> Duration {
        let secs = match tier {
            Priority::High => self.high_interval,
            Priority::Medium => self.medium_interval,
            Priority::Low => self.low_interval,
        };
        Duration::from_secs(secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            high_interval: default_high_interval(),
            medium_interval: default_medium_interval(),
            low_interval: default_low_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8081);
    }

    #[test]
    fn test_tier_intervals() {
        let scheduler = SchedulerConfig::default();
        assert_eq!(scheduler.interval_for(Priority::High), Duration::from_secs(10));
        assert_eq!(scheduler.interval_for(Priority::Medium), Duration::from_secs(30));
        assert_eq!(scheduler.interval_for(Priority::Low), Duration::from_secs(60));
    }
}
