//! Receiver device communication.
//!
//! A [`ReceiverConnection`] owns the single TCP link to one wireless-mic
//! receiver and yields framed status messages off it. The receiver speaks a
//! line-oriented ASCII protocol on port 2202 with `>` terminating each status
//! message; framing is handled by [`framer::MessageFramer`].
//!
//! The connection is exclusively owned and sequentially accessed by the
//! monitor loop. Dialing is bounded by a timeout; reads block until the next
//! terminator arrives, which is the monitor's natural idle point.

use std::time::Duration;

use log::{debug, info};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::logutil::escape_log;

pub mod framer;
use framer::MessageFramer;

/// TCP port the receiver's status protocol listens on.
pub const STATUS_PORT: u16 = 2202;

#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("could not connect to device at {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out connecting to device at {address} after {timeout:?}")]
    DialTimeout { address: String, timeout: Duration },

    #[error("problem reading receiver stream: {0}")]
    Read(#[from] std::io::Error),

    #[error("receiver closed the connection")]
    Closed,
}

/// Persistent connection to one receiver's status port.
pub struct ReceiverConnection {
    stream: TcpStream,
    framer: MessageFramer,
    peer: String,
}

impl ReceiverConnection {
    /// Dial `address` with a bounded timeout.
    ///
    /// `address` may carry an explicit port; otherwise [`STATUS_PORT`] is
    /// appended. A dial failure or timeout is terminal for the caller: a
    /// dead device is not expected to self-heal quickly, so there is no
    /// retry here.
    pub async fn dial(address: &str, dial_timeout: Duration) -> Result<Self, ReceiverError> {
        let target = if address.contains(':') {
            address.to_string()
        } else {
            format!("{}:{}", address, STATUS_PORT)
        };

        info!("connecting to receiver at {}...", target);
        let stream = match timeout(dial_timeout, TcpStream::connect(&target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(ReceiverError::Dial {
                    address: target,
                    source,
                })
            }
            Err(_) => {
                return Err(ReceiverError::DialTimeout {
                    address: target,
                    timeout: dial_timeout,
                })
            }
        };
        info!("successfully connected to receiver at {}", target);

        Ok(Self {
            stream,
            framer: MessageFramer::new(),
            peer: target,
        })
    }

    /// Read the next framed status message, blocking until its terminator
    /// arrives or the stream errs.
    ///
    /// The terminator is stripped. A read error or remote close surfaces per
    /// message so the caller can report it and keep the loop alive; one bad
    /// frame must not silence the room.
    pub async fn read_message(&mut self) -> Result<String, ReceiverError> {
        loop {
            if let Some(raw) = self.framer.next_message() {
                // Protocol is ASCII; lossy conversion keeps a garbled frame
                // visible downstream instead of killing the read loop.
                let message = String::from_utf8_lossy(&raw).into_owned();
                debug!("read status frame from {}: {}", self.peer, escape_log(&message));
                return Ok(message);
            }

            let mut chunk = [0u8; 1024];
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(ReceiverError::Closed);
            }
            self.framer.push(&chunk[..n]);
        }
    }

    /// Remote endpoint this connection was dialed against.
    pub fn peer(&self) -> &str {
        &self.peer
    }
}
