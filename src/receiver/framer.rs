//! Sentinel-delimited framer for the receiver status stream.
//!
//! The receiver emits ASCII status lines terminated by `>`:
//!
//!   `< REP 1 BATT 45 minutes >< REP 2 TX_PWR ON >`
//!
//! This module provides a small incremental framer that can be fed arbitrary
//! chunks and yields whole messages when available. The terminator is
//! consumed but excluded from the yielded message; it is never escaped on the
//! wire, so a plain byte scan is sufficient.
use bytes::{Buf, BytesMut};

/// Terminator byte ending every status message.
pub const MESSAGE_TERMINATOR: u8 = b'>';

/// Incremental `>`-delimited message framer.
///
/// No maximum length is enforced: the receiver is trusted hardware with a
/// known protocol, and an unterminated stream simply never yields. Multiple
/// terminators in one chunk are fine; each [`next_message`](Self::next_message)
/// call returns exactly one message ending at the next unconsumed terminator.
pub struct MessageFramer {
    buf: BytesMut,
}

impl MessageFramer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
        }
    }

    /// Append a chunk read off the wire.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Extract the next complete message, if one is buffered.
    ///
    /// Returns the message bytes with the terminator stripped, or `None` when
    /// no terminator has arrived yet.
    pub fn next_message(&mut self) -> Option<Vec<u8>> {
        let end = self.buf.iter().position(|&b| b == MESSAGE_TERMINATOR)?;
        let message = self.buf.split_to(end).to_vec();
        self.buf.advance(1); // discard the terminator itself
        Some(message)
    }

    /// Bytes buffered but not yet terminated.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self::new()
    }
}
