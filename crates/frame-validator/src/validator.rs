//! Frame Validator for Position Records

use crate::error::RejectReason;
use serde::{Deserialize, Serialize};
use uwb_protocol::{Axis, PositionMessage, RawFrame, FRAME_SIZE};

/// Largest believable coordinate magnitude, in wire units (centimeters)
pub const DEFAULT_COORDINATE_LIMIT: f64 = 100_000.0;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Exclusive bound on `|pos|` for every axis, in wire units
    pub coordinate_limit: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            coordinate_limit: DEFAULT_COORDINATE_LIMIT,
        }
    }
}

/// Validator for assembled position frames
#[derive(Debug, Clone)]
pub struct FrameValidator {
    config: ValidationConfig,
}

impl FrameValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Accept a frame only if it is a full record holding a valid, sane fix.
    ///
    /// Checks run in order: length, status, then x, y, z range.
    pub fn validate(&self, frame: &RawFrame) -> Result<PositionMessage, RejectReason> {
        if frame.is_empty() {
            return Err(RejectReason::NoData);
        }
        if !frame.is_complete() {
            return Err(RejectReason::Truncated {
                received: frame.len(),
                expected: FRAME_SIZE,
            });
        }

        let msg = PositionMessage::decode(frame.buffer());
        if msg.status != PositionMessage::STATUS_OK {
            return Err(RejectReason::BadStatus(msg.status));
        }

        for axis in [Axis::X, Axis::Y, Axis::Z] {
            self.validate_axis(axis, msg.axis(axis))?;
        }
        Ok(msg)
    }

    /// Validate one raw coordinate against the configured limit
    pub fn validate_axis(&self, axis: Axis, raw: i32) -> Result<(), RejectReason> {
        let limit = self.config.coordinate_limit;
        if f64::from(raw).abs() < limit {
            Ok(())
        } else {
            Err(RejectReason::OutOfRange { axis, raw, limit })
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl Default for FrameValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
