//! Status message normalization pipeline.
//!
//! One raw framed message goes through a single classify / extract / filter /
//! derive pass and comes out as zero or more [`Event`]s:
//!
//! 1. Locate the channel marker `REP <digit>`. Channel identity is a
//!    precondition for any event; a message without it is not telemetry and
//!    yields nothing.
//! 2. Classify by category token, first match wins. Unclassified messages
//!    are expected idle traffic and yield nothing.
//! 3. Extract the category's key/value fields onto the event.
//! 4. Suppress sentinel readings and keyless partials.
//! 5. For a minutes-remaining reading, append the derived hours/minutes
//!    event after the primary.
//!
//! The pipeline holds no state across calls; the same bytes always produce
//! the same event sequence.

use log::debug;
use regex::Regex;
use std::sync::OnceLock;

use crate::events::{DeviceIdentity, Event};
use crate::logutil::escape_log;

pub mod classify;
pub mod derive;
pub mod extract;

pub use classify::EventCategory;
pub use derive::derive_runtime_event;
pub use extract::{ExtractError, FieldExtractor};

fn channel_marker() -> &'static Regex {
    static CHANNEL_MARKER: OnceLock<Regex> = OnceLock::new();
    CHANNEL_MARKER.get_or_init(|| Regex::new(r"REP [0-9]").expect("channel marker pattern"))
}

/// Outcome of normalizing one raw status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Surviving events, primary first, derived (if any) after it.
    pub events: Vec<Event>,
    /// Set when field extraction failed on a classified message. The
    /// partially built event is still present in `events` so the anomaly
    /// stays visible downstream.
    pub error: Option<ExtractError>,
}

impl Report {
    fn empty() -> Self {
        Self {
            events: Vec::new(),
            error: None,
        }
    }
}

/// Normalize one raw status message for the given room.
///
/// `room_id` is the `{building}-{room}` key; the channel digit from the wire
/// marker completes the device identity.
pub fn extract_events(raw: &str, room_id: &str) -> Report {
    let marker = match channel_marker().find(raw) {
        Some(marker) => marker,
        None => {
            debug!("no channel marker in frame, nothing to report");
            return Report::empty();
        }
    };
    let channel = marker
        .as_str()
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
        .unwrap_or_default(); // marker pattern ends in a digit

    let device = DeviceIdentity::new(room_id, channel);
    debug!("device {} reporting", device);

    let data = channel_marker().replace_all(raw, "");

    let category = match EventCategory::classify(&data) {
        Some(category) => category,
        None => {
            debug!("frame matches no category, ignoring: {}", escape_log(raw));
            return Report::empty();
        }
    };

    let mut event = Event::new(device);
    let outcome = category.extractor().extract(&data, &mut event);

    // Sentinel readings and keyless partials are noise either way; the
    // filter applies before any extraction error is surfaced.
    if event.is_flagged() || event.key.is_empty() {
        debug!("ignoring event from frame: {}", escape_log(raw));
        return Report::empty();
    }

    if let Err(error) = outcome {
        return Report {
            events: vec![event],
            error: Some(error),
        };
    }

    let mut events = vec![event];
    if let Some(derived) = derive_runtime_event(&events[0]) {
        events.push(derived);
    }
    Report {
        events,
        error: None,
    }
}
