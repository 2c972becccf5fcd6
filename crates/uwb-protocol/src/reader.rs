//! Time-Delimited Frame Reader
//!
//! Records carry no start or end marker, and the driver may start in the
//! middle of one or lose a byte in transit. Each attempt therefore:
//!
//! - waits up to [`MESSAGE_TIMEOUT`] for the first byte of a record
//! - keeps reading while bytes arrive less than [`BYTE_TIMEOUT`] apart
//! - stops at `FRAME_SIZE` bytes, or at the first gap, keeping the prefix
//!
//! End of stream or a read error before the first byte counts as silence:
//! the attempt still lasts the full message timeout.
//!
//! An incomplete prefix is handed to the validator and discarded there; the
//! next attempt always starts from an empty buffer.
//!
//! The byte timeout must stay well under the ~37 ms gap between records or
//! the next record would be appended to the current one. Below ~1 ms it
//! cuts records short because of the module's own inter-byte delay.

use crate::message::{RawFrame, FRAME_SIZE};
use crate::source::ByteSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Maximum wait for the first byte of a record
pub const MESSAGE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Maximum gap between two bytes of the same record
pub const BYTE_TIMEOUT: Duration = Duration::from_millis(5);

/// Timeout pair used by the frame reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTimeouts {
    /// Wait for the first byte; expiry means the module is silent
    pub message: Duration,
    /// Wait between bytes; expiry ends the record
    pub byte: Duration,
}

impl Default for FrameTimeouts {
    fn default() -> Self {
        Self {
            message: MESSAGE_TIMEOUT,
            byte: BYTE_TIMEOUT,
        }
    }
}

/// Framing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadState {
    /// Nothing received in this attempt yet
    AwaitingFirstByte,
    /// Part of a record received
    Accumulating,
    /// A full record was received
    Complete,
    /// A wait expired (or the source failed) before the record was full
    TimedOut,
}

/// Assembles one raw frame per attempt from a byte source
#[derive(Debug)]
pub struct FrameReader {
    frame: RawFrame,
    state: ReadState,
    timeouts: FrameTimeouts,
    attempts: u64,
}

impl FrameReader {
    /// Create a reader with the given timeouts
    pub fn new(timeouts: FrameTimeouts) -> Self {
        Self {
            frame: RawFrame::new(),
            state: ReadState::AwaitingFirstByte,
            timeouts,
            attempts: 0,
        }
    }

    /// Run one framing attempt and return what was collected
    pub async fn read_frame<S>(&mut self, source: &mut S) -> RawFrame
    where
        S: ByteSource + ?Sized,
    {
        self.frame.clear();
        self.state = ReadState::AwaitingFirstByte;
        self.attempts += 1;

        let started = Instant::now();
        let mut wait = self.timeouts.message;
        while self.frame.len() < FRAME_SIZE {
            match source.read_with_timeout(self.frame.unfilled_mut(), wait).await {
                Ok(Some(n)) if n > 0 => {
                    self.frame.advance(n);
                    if self.state == ReadState::AwaitingFirstByte {
                        trace!("First byte received");
                        self.state = ReadState::Accumulating;
                    }
                    wait = self.timeouts.byte;
                }
                Ok(Some(_)) => {
                    debug!("Byte source reached end of stream");
                    self.idle_until(started).await;
                    break;
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("Byte source read failed: {}", e);
                    self.idle_until(started).await;
                    break;
                }
            }
        }

        self.state = if self.frame.is_complete() {
            ReadState::Complete
        } else {
            ReadState::TimedOut
        };
        trace!(
            "Framing attempt {} ended {:?} with {} bytes",
            self.attempts,
            self.state,
            self.frame.len()
        );

        self.frame
    }

    /// Sit out the rest of the message timeout if nothing arrived yet
    async fn idle_until(&self, started: Instant) {
        if self.state == ReadState::AwaitingFirstByte {
            sleep_until(started + self.timeouts.message).await;
        }
    }

    /// State at the end of the last attempt
    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Number of attempts run so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Configured timeouts
    pub fn timeouts(&self) -> FrameTimeouts {
        self.timeouts
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new(FrameTimeouts::default())
    }
}
