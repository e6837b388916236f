//! Room monitor: connection lifecycle and the read/publish loop.
//!
//! One [`Monitor`] instance owns one room's receiver link end to end:
//! resolve the device, dial it, then pull framed status messages forever and
//! forward the surviving events to the publisher.
//!
//! Fault policy is deliberately asymmetric and must stay that way:
//!
//! - lookup failures are transient infrastructure, retried forever with a
//!   fixed delay (registration may lag service startup);
//! - zero devices resolved is a terminal no-op, more than one is a reported
//!   configuration fault; either way this instance stops;
//! - a dial failure is reported once and stops this instance (a dead device
//!   is not expected to self-heal; the caller restarts the monitor);
//! - per-message faults (read, extraction, publish) are reported and the
//!   loop continues. One bad frame must never silence the whole room.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info};
use tokio::time::sleep;

use crate::config::Config;
use crate::lookup::{DeviceLookup, RECEIVER_ROLE};
use crate::protocol;
use crate::publishing::EventPublisher;
use crate::receiver::ReceiverConnection;

pub struct Monitor {
    building: String,
    room: String,
    system_id: String,
    port: u16,
    dial_timeout: Duration,
    lookup_retry_delay: Duration,
    lookup: Arc<dyn DeviceLookup>,
    publisher: Arc<dyn EventPublisher>,
}

impl Monitor {
    pub fn new(
        config: &Config,
        lookup: Arc<dyn DeviceLookup>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            building: config.service.building.clone(),
            room: config.service.room.clone(),
            system_id: config.service.system_id(),
            port: config.receiver.port,
            dial_timeout: config.receiver.dial_timeout(),
            lookup_retry_delay: config.lookup.retry_delay(),
            lookup,
            publisher,
        }
    }

    /// Run the monitor to completion.
    ///
    /// Returns `Ok(())` on every terminal condition; all faults surface
    /// through the error-reporting transport and the process log, not the
    /// return value.
    pub async fn run(&self) -> Result<()> {
        info!(
            "starting mic reporting in building {}, room {}",
            self.building, self.room
        );
        let room_key = format!("{}-{}", self.building, self.room);

        let devices = loop {
            match self.lookup.resolve_devices(&room_key, RECEIVER_ROLE).await {
                Ok(devices) => break devices,
                Err(e) => {
                    debug!(
                        "receiver not found: {}, retrying in {:?}...",
                        e, self.lookup_retry_delay
                    );
                    sleep(self.lookup_retry_delay).await;
                }
            }
        };

        if devices.is_empty() {
            info!("no receiver detected in room {}, stopping monitor", room_key);
            return Ok(());
        }
        if devices.len() > 1 {
            let msg = format!(
                "detected {} receivers in room {}, expecting 1",
                devices.len(),
                room_key
            );
            self.publisher
                .report_error(&msg, &self.system_id, &self.building, &self.room)
                .await;
            return Ok(());
        }

        let device = &devices[0];
        info!("resolved receiver {} at {}", device.name, device.address);

        let address = if device.address.contains(':') {
            device.address.clone()
        } else {
            format!("{}:{}", device.address, self.port)
        };
        let mut connection = match ReceiverConnection::dial(&address, self.dial_timeout).await {
            Ok(connection) => connection,
            Err(e) => {
                let msg = format!("could not connect to device: {}", e);
                self.publisher
                    .report_error(&msg, &device.name, &self.building, &self.room)
                    .await;
                return Ok(());
            }
        };

        info!("listening for receiver events on {}...", connection.peer());
        loop {
            let raw = match connection.read_message().await {
                Ok(raw) => raw,
                Err(e) => {
                    let msg = format!("problem reading receiver string: {}", e);
                    self.publisher
                        .report_error(&msg, &self.system_id, &self.building, &self.room)
                        .await;
                    continue;
                }
            };

            let report = protocol::extract_events(&raw, &room_key);
            if let Some(error) = report.error {
                let msg = format!("problem reading receiver string: {}", error);
                self.publisher
                    .report_error(&msg, &self.system_id, &self.building, &self.room)
                    .await;
            }

            for event in &report.events {
                if let Err(e) = self
                    .publisher
                    .publish(false, event, &self.building, &self.room)
                    .await
                {
                    let msg = format!("failed to publish event: {}", e);
                    self.publisher
                        .report_error(&msg, &self.system_id, &self.building, &self.room)
                        .await;
                }
            }
        }
    }
}
