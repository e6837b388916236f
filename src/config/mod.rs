//! Configuration management.
//!
//! All knobs live in a TOML file, organized by concern:
//!
//! - [`ServiceConfig`] - which room this instance monitors and the identity
//!   used on errors reported before a device is resolved
//! - [`LookupConfig`] - device registry endpoint and retry pacing
//! - [`ReceiverConfig`] - status port and dial timeout
//! - [`PublishingConfig`] - event and error transport endpoints
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ```toml
//! [service]
//! building = "BLDG"
//! room = "101"
//!
//! [lookup]
//! base_url = "http://localhost:8006"
//!
//! [receiver]
//! port = 2202
//!
//! [publishing]
//! event_url = "http://localhost:7003/events"
//! error_url = "http://localhost:7003/errors"
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Building identifier, e.g. `BLDG`.
    pub building: String,
    /// Room identifier within the building, e.g. `101`.
    pub room: String,
    /// Actor identity on errors reported before a device is resolved.
    /// Falls back to the `SYSTEM_ID` environment variable when empty.
    #[serde(default)]
    pub system_id: String,
}

impl ServiceConfig {
    pub fn system_id(&self) -> String {
        if !self.system_id.is_empty() {
            self.system_id.clone()
        } else {
            std::env::var("SYSTEM_ID").unwrap_or_default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Device registry base URL.
    pub base_url: String,
    #[serde(default = "default_http_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Fixed delay between lookup retries. Lookups retry indefinitely;
    /// device registration may lag service startup.
    #[serde(default = "default_lookup_retry_seconds")]
    pub retry_seconds: u64,
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// TCP port of the receiver's status protocol.
    #[serde(default = "default_status_port")]
    pub port: u16,
    #[serde(default = "default_dial_timeout_seconds")]
    pub dial_timeout_seconds: u64,
}

impl ReceiverConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishingConfig {
    /// Event transport endpoint.
    pub event_url: String,
    /// Error-reporting transport endpoint.
    pub error_url: String,
    #[serde(default = "default_http_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl PublishingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub lookup: LookupConfig,
    pub receiver: ReceiverConfig,
    pub publishing: PublishingConfig,
    pub logging: LoggingConfig,
}

fn default_http_timeout_seconds() -> u64 {
    5
}

fn default_lookup_retry_seconds() -> u64 {
    5
}

fn default_status_port() -> u16 {
    crate::receiver::STATUS_PORT
}

fn default_dial_timeout_seconds() -> u64 {
    3
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject configurations that cannot identify a room or reach the
    /// external collaborators.
    pub fn validate(&self) -> Result<()> {
        if self.service.building.trim().is_empty() {
            return Err(anyhow!("service.building must not be empty"));
        }
        if self.service.room.trim().is_empty() {
            return Err(anyhow!("service.room must not be empty"));
        }
        if self.lookup.base_url.trim().is_empty() {
            return Err(anyhow!("lookup.base_url must not be empty"));
        }
        if self.publishing.event_url.trim().is_empty() {
            return Err(anyhow!("publishing.event_url must not be empty"));
        }
        if self.publishing.error_url.trim().is_empty() {
            return Err(anyhow!("publishing.error_url must not be empty"));
        }
        if self.receiver.port == 0 {
            return Err(anyhow!("receiver.port must not be 0"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service: ServiceConfig {
                building: "BLDG".to_string(),
                room: "101".to_string(),
                system_id: String::new(),
            },
            lookup: LookupConfig {
                base_url: "http://localhost:8006".to_string(),
                timeout_seconds: default_http_timeout_seconds(),
                retry_seconds: default_lookup_retry_seconds(),
            },
            receiver: ReceiverConfig {
                port: default_status_port(),
                dial_timeout_seconds: default_dial_timeout_seconds(),
            },
            publishing: PublishingConfig {
                event_url: "http://localhost:7003/events".to_string(),
                error_url: "http://localhost:7003/errors".to_string(),
                timeout_seconds: default_http_timeout_seconds(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}
