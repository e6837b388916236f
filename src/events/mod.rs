//! Structured event model for receiver telemetry.
//!
//! A raw status line from the receiver is normalized into zero or more
//! [`Event`]s addressed to the logical microphone device the line pertains
//! to. Events are plain key/value readings; the publishing layer stamps
//! timestamps and routing metadata at send time, so two identical status
//! lines always normalize to identical event sequences.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Reserved value meaning "no meaningful reading".
///
/// The receiver reports placeholder codes when a channel has no transmitter
/// paired or the reading is stale; extractors normalize those to this
/// sentinel and the pipeline suppresses any event carrying it. Comparison is
/// case-insensitive.
pub const FLAG: &str = "UNKNOWN";

/// Identity of the microphone channel a status line pertains to.
///
/// Synthesized from the room identifier and the channel digit of the
/// `REP <digit>` marker embedded in the raw message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    /// Room identifier, e.g. `BLDG-101`.
    pub room_id: String,
    /// Per-receiver channel index from the wire marker.
    pub channel: u8,
}

impl DeviceIdentity {
    pub fn new(room_id: impl Into<String>, channel: u8) -> Self {
        Self {
            room_id: room_id.into(),
            channel,
        }
    }

    /// Logical device name used by downstream consumers, `{room}-MIC{n}`.
    pub fn device_id(&self) -> String {
        format!("{}-MIC{}", self.room_id, self.channel)
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-MIC{}", self.room_id, self.channel)
    }
}

/// Descriptive tags attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    /// Fine-grained device state reading.
    DetailState,
    /// Synthesized by this service rather than read off the wire.
    AutoGenerated,
}

/// One normalized telemetry reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(rename = "target-device")]
    pub device: DeviceIdentity,
    pub key: String,
    pub value: String,
    #[serde(rename = "event-tags")]
    pub tags: BTreeSet<Tag>,
}

impl Event {
    /// An empty event addressed to `device`; extractors fill key/value.
    pub fn new(device: DeviceIdentity) -> Self {
        Self {
            device,
            key: String::new(),
            value: String::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn add_tags(&mut self, tags: impl IntoIterator<Item = Tag>) {
        self.tags.extend(tags);
    }

    /// True when the value is the no-reading sentinel, any letter case.
    pub fn is_flagged(&self) -> bool {
        self.value.eq_ignore_ascii_case(FLAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_synthesis() {
        let id = DeviceIdentity::new("BLDG-101", 1);
        assert_eq!(id.device_id(), "BLDG-101-MIC1");
        assert_eq!(id.to_string(), "BLDG-101-MIC1");
    }

    #[test]
    fn flag_comparison_is_case_insensitive() {
        let mut event = Event::new(DeviceIdentity::new("A-1", 2));
        event.value = "unknown".into();
        assert!(event.is_flagged());
        event.value = "Unknown".into();
        assert!(event.is_flagged());
        event.value = "45".into();
        assert!(!event.is_flagged());
    }

    #[test]
    fn tag_serialization_is_kebab_case() {
        let json = serde_json::to_string(&Tag::AutoGenerated).unwrap();
        assert_eq!(json, "\"auto-generated\"");
        let json = serde_json::to_string(&Tag::DetailState).unwrap();
        assert_eq!(json, "\"detail-state\"");
    }
}
