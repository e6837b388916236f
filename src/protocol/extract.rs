//! Per-category field extraction.
//!
//! Each [`EventCategory`] has an extractor implementing the shared
//! [`FieldExtractor`] capability: parse the marker-stripped message into a
//! key/value pair on the target event. Extraction failure never discards the
//! event; whatever was parsed stays on it so protocol anomalies remain
//! visible downstream alongside the reported error.

use thiserror::Error;

use crate::events::{Event, FLAG};

use super::classify::{BATTERY_TOKEN, EventCategory, INTERFERENCE_TOKEN, POWER_TOKEN};

/// No-reading code the receiver sends for battery bars.
const BARS_NO_READING: &str = "255";
/// No-reading code the receiver sends for runtime minutes.
const MINUTES_NO_READING: &str = "65535";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("missing {field} field in {token} report")]
    MissingField {
        token: &'static str,
        field: &'static str,
    },

    #[error("unrecognized battery unit {unit:?}")]
    UnknownUnit { unit: String },
}

/// Shared extraction capability, one implementation per category.
pub trait FieldExtractor {
    /// Parse `message` (channel marker already stripped) into key/value on
    /// `event`. On error the event keeps whatever fields were already set.
    fn extract(&self, message: &str, event: &mut Event) -> Result<(), ExtractError>;
}

impl EventCategory {
    /// Dispatch to this category's extractor.
    pub fn extractor(&self) -> &'static dyn FieldExtractor {
        match self {
            EventCategory::Interference => &Interference,
            EventCategory::Power => &Power,
            EventCategory::Battery => &Battery,
        }
    }
}

/// Whitespace-separated fields following `token` in `message`.
fn fields_after<'a>(message: &'a str, token: &str) -> impl Iterator<Item = &'a str> {
    message
        .split_once(token)
        .map(|(_, rest)| rest)
        .unwrap_or("")
        .split_whitespace()
}

/// RF interference reports: `RF_INT_DET <level>`.
///
/// A missing or `NONE` level is the receiver's "no reading" shape, not a
/// malformed frame; it maps to the sentinel and gets filtered out.
pub struct Interference;

impl FieldExtractor for Interference {
    fn extract(&self, message: &str, event: &mut Event) -> Result<(), ExtractError> {
        event.key = "interference".to_string();
        event.value = match fields_after(message, INTERFERENCE_TOKEN).next() {
            None => FLAG.to_string(),
            Some(level) if level.eq_ignore_ascii_case("NONE") => FLAG.to_string(),
            Some(level) => level.to_string(),
        };
        Ok(())
    }
}

/// Transmitter power-state reports: `TX_PWR <ON|OFF|...>`.
pub struct Power;

impl FieldExtractor for Power {
    fn extract(&self, message: &str, event: &mut Event) -> Result<(), ExtractError> {
        event.key = "power".to_string();
        match fields_after(message, POWER_TOKEN).next() {
            Some(state) => {
                event.value = state.to_string();
                Ok(())
            }
            None => Err(ExtractError::MissingField {
                token: POWER_TOKEN,
                field: "state",
            }),
        }
    }
}

/// Battery reports, in one of three representations:
///
/// - `BATT <n> minutes` - countdown of runtime remaining
/// - `BATT <n> percent` / `BATT <n>%` - charge percentage
/// - `BATT <n>` / `BATT <n> bars` - discrete level
///
/// The key reflects which representation was present. The receiver's
/// no-reading codes (255 bars, 65535 minutes) map to the sentinel.
pub struct Battery;

impl FieldExtractor for Battery {
    fn extract(&self, message: &str, event: &mut Event) -> Result<(), ExtractError> {
        let mut fields = fields_after(message, BATTERY_TOKEN);
        let level = match fields.next() {
            Some(level) => level,
            None => {
                event.key = "battery level".to_string();
                return Err(ExtractError::MissingField {
                    token: BATTERY_TOKEN,
                    field: "level",
                });
            }
        };

        if let Some(percentage) = level.strip_suffix('%') {
            event.key = "percentage".to_string();
            event.value = percentage.to_string();
            return Ok(());
        }

        match fields.next() {
            Some(unit) if unit.eq_ignore_ascii_case("minutes") => {
                event.key = "minutes".to_string();
                event.value = if level == MINUTES_NO_READING {
                    FLAG.to_string()
                } else {
                    level.to_string()
                };
                Ok(())
            }
            Some(unit) if unit.eq_ignore_ascii_case("percent") => {
                event.key = "percentage".to_string();
                event.value = level.to_string();
                Ok(())
            }
            Some(unit) if unit.eq_ignore_ascii_case("bars") => {
                event.key = "battery level".to_string();
                event.value = bars_value(level);
                Ok(())
            }
            None => {
                event.key = "battery level".to_string();
                event.value = bars_value(level);
                Ok(())
            }
            Some(unit) => {
                event.key = "battery level".to_string();
                event.value = level.to_string();
                Err(ExtractError::UnknownUnit {
                    unit: unit.to_string(),
                })
            }
        }
    }
}

fn bars_value(level: &str) -> String {
    if level == BARS_NO_READING {
        FLAG.to_string()
    } else {
        level.to_string()
    }
}
