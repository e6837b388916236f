//! Derived battery-runtime events.
//!
//! A minutes-remaining reading is more useful to humans as hours and
//! minutes, so a second, machine-derived event is synthesized alongside the
//! raw one. The raw event is always published regardless.

use crate::events::{Event, Tag};

/// Key carried by the derived hours/minutes event.
pub const HOURS_MINUTES_KEY: &str = "battery level (hours:minutes remaining)";

/// Synthesize the hours/minutes sibling for a minutes-remaining event.
///
/// Returns `None` when the primary event is not a minutes reading or its
/// value does not parse as an integer. Parse failure is deliberately silent:
/// the primary event still carries the raw count, so nothing is lost.
pub fn derive_runtime_event(primary: &Event) -> Option<Event> {
    if !primary.key.contains("minutes") {
        return None;
    }
    let total: i64 = primary.value.trim().parse().ok()?;

    let mut event = Event::new(primary.device.clone());
    event.key = HOURS_MINUTES_KEY.to_string();
    event.value = format!("{}:{}", total / 60, total % 60);
    event.add_tags([Tag::DetailState, Tag::AutoGenerated]);
    Some(event)
}
