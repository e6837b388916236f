//! Device lookup.
//!
//! Which receiver serves a room is registry data owned by an external
//! service; this module is the thin client side of that contract. The
//! capability is a trait so the monitor can be exercised against an
//! in-memory registry in tests.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Role string identifying receiver base stations in the registry.
pub const RECEIVER_ROLE: &str = "Receiver";

/// One registered device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Device {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("lookup service returned {status} for room {room}")]
    Status {
        room: String,
        status: reqwest::StatusCode,
    },
}

/// Capability to resolve the devices filling a role in a room.
///
/// Callers must treat failures as transient and retry; device registration
/// may lag service startup. A result count other than one is a configuration
/// fault for the caller to handle, not this interface.
#[async_trait]
pub trait DeviceLookup: Send + Sync {
    async fn resolve_devices(&self, room_key: &str, role: &str)
        -> Result<Vec<Device>, LookupError>;
}

/// HTTP client for the device registry.
pub struct HttpDeviceLookup {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDeviceLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl DeviceLookup for HttpDeviceLookup {
    async fn resolve_devices(
        &self,
        room_key: &str,
        role: &str,
    ) -> Result<Vec<Device>, LookupError> {
        let url = format!("{}/rooms/{}/devices", self.base_url, room_key);
        let response = self
            .client
            .get(&url)
            .query(&[("role", role)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                room: room_key.to_string(),
                status,
            });
        }

        Ok(response.json().await?)
    }
}
