//! Test fixtures: an in-memory device registry and a recording publisher.
//! Both implement the capability traits the monitor consumes, so monitor
//! behavior can be exercised without the external HTTP collaborators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use micbridge::events::Event;
use micbridge::lookup::{Device, DeviceLookup, LookupError};
use micbridge::publishing::{EventPublisher, PublishError};

/// Registry stub resolving a fixed device list, optionally failing a set
/// number of times first to exercise the retry-forever lookup policy.
pub struct StaticLookup {
    devices: Vec<Device>,
    failures_remaining: Mutex<u32>,
    calls: Mutex<u32>,
}

impl StaticLookup {
    pub fn new(devices: Vec<Device>) -> Arc<Self> {
        Self::failing_first(devices, 0)
    }

    pub fn failing_first(devices: Vec<Device>, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            devices,
            failures_remaining: Mutex::new(failures),
            calls: Mutex::new(0),
        })
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl DeviceLookup for StaticLookup {
    async fn resolve_devices(
        &self,
        room_key: &str,
        _role: &str,
    ) -> Result<Vec<Device>, LookupError> {
        *self.calls.lock().unwrap() += 1;
        let mut remaining = self.failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(LookupError::Status {
                room: room_key.to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(self.devices.clone())
    }
}

/// Publisher stub recording everything it is handed.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<Event>>,
    errors: Mutex<Vec<(String, String)>>, // (identity, message)
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }

    /// Poll until `count` events have been published. Pair with a test
    /// timeout; the monitor loop never returns on its own.
    pub async fn wait_for_events(&self, count: usize) {
        while self.events.lock().unwrap().len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(
        &self,
        _is_final: bool,
        event: &Event,
        _building: &str,
        _room: &str,
    ) -> Result<(), PublishError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn report_error(&self, message: &str, identity: &str, _building: &str, _room: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((identity.to_string(), message.to_string()));
    }
}
