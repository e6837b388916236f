//! Event publishing and error reporting.
//!
//! Both are thin HTTP calls to external transports. Publishing can fail and
//! the caller decides what to do about it; error reporting must never create
//! more errors, so reporter failures are logged and swallowed.
//!
//! The publisher stamps the timestamp at send time. Events themselves stay
//! timestamp-free so the normalization pipeline is a pure function of the
//! wire bytes.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::events::Event;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("event transport returned {0}")]
    Status(reqwest::StatusCode),
}

/// Capability to hand events and faults to the downstream transports.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one surviving event for the room.
    async fn publish(
        &self,
        is_final: bool,
        event: &Event,
        building: &str,
        room: &str,
    ) -> Result<(), PublishError>;

    /// Report a fault on behalf of `identity`. Infallible by contract.
    async fn report_error(&self, message: &str, identity: &str, building: &str, room: &str);
}

/// HTTP publisher for the event and error transports.
pub struct HttpPublisher {
    event_url: String,
    error_url: String,
    client: reqwest::Client,
}

impl HttpPublisher {
    pub fn new(event_url: &str, error_url: &str, timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            event_url: event_url.to_string(),
            error_url: error_url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl EventPublisher for HttpPublisher {
    async fn publish(
        &self,
        is_final: bool,
        event: &Event,
        building: &str,
        room: &str,
    ) -> Result<(), PublishError> {
        let payload = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "target-device": { "device-id": event.device.device_id() },
            "affected-room": { "building-id": building, "room-id": room },
            "key": event.key,
            "value": event.value,
            "event-tags": event.tags,
            "final": is_final,
        });

        let response = self.client.post(&self.event_url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Status(status));
        }
        debug!(
            "published {}={} for {}",
            event.key,
            event.value,
            event.device.device_id()
        );
        Ok(())
    }

    async fn report_error(&self, message: &str, identity: &str, building: &str, room: &str) {
        error!("[{}] {}", identity, message);

        let payload = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "message": message,
            "identity": identity,
            "building": building,
            "room": room,
        });

        match self.client.post(&self.error_url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                error!(
                    "error transport returned {} while reporting: {}",
                    response.status(),
                    message
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!("could not reach error transport ({}) while reporting: {}", e, message);
            }
        }
    }
}
