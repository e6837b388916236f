//! Logging helpers for raw receiver frames.
//!
//! Status frames arrive with whatever the device felt like sending,
//! control bytes and the occasional partial line after a power cycle
//! included. Logs stay single-line and bounded regardless.

/// Render a raw frame for single-line logging.
///
/// Control characters are escaped (`\n`, `\r`, `\t`, other controls as
/// `\xNN`) and the result is truncated with an ellipsis past `MAX_PREVIEW`
/// characters. Status frames are short; anything longer is a framing anomaly
/// worth seeing the head of, not the whole of.
pub fn escape_log(frame: &str) -> String {
    const MAX_PREVIEW: usize = 120;
    let mut out = String::with_capacity(frame.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in frame.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_log;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("REP 1 BATT 45\r\n"), "REP 1 BATT 45\\r\\n");
        assert_eq!(escape_log("a\x07b"), "a\\x07b");
    }

    #[test]
    fn truncates_runaway_frames() {
        let long = "X".repeat(500);
        let escaped = escape_log(&long);
        assert!(escaped.ends_with('…'));
        assert!(escaped.chars().count() <= 121);
    }
}
