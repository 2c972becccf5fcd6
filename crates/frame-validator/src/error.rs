//! Rejection Reasons

use thiserror::Error;
use uwb_protocol::Axis;

/// Why a frame was not published
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    /// Nothing arrived within the message timeout
    #[error("no data received")]
    NoData,

    /// Partial record
    #[error("read {received} bytes instead of {expected}")]
    Truncated { received: usize, expected: usize },

    /// Module could not compute a fix
    #[error("status {0:#04X} is not a valid fix")]
    BadStatus(u8),

    /// Coordinate too large to be real (usually a missed anchor)
    #[error("{axis} value {raw} is out of range (|{axis}| < {limit})")]
    OutOfRange { axis: Axis, raw: i32, limit: f64 },
}

impl RejectReason {
    /// Check if the module produced no bytes at all
    pub fn is_silence(&self) -> bool {
        matches!(self, RejectReason::NoData)
    }
}
