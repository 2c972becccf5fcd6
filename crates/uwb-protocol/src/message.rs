//! Position Message Definitions
//!
//! Wire layout of the module's position record and the report published
//! for every accepted fix.

use crate::offset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire size of one position record
pub const FRAME_SIZE: usize = 51;

/// Raw frame buffer as assembled by the frame reader
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    bytes: [u8; FRAME_SIZE],
    len: usize,
}

impl RawFrame {
    /// Create an empty frame
    pub const fn new() -> Self {
        Self {
            bytes: [0; FRAME_SIZE],
            len: 0,
        }
    }

    /// Create a frame from a byte prefix (at most `FRAME_SIZE` bytes are kept)
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut frame = Self::new();
        let len = data.len().min(FRAME_SIZE);
        frame.bytes[..len].copy_from_slice(&data[..len]);
        frame.len = len;
        frame
    }

    /// Number of bytes collected
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no bytes were collected
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the buffer holds exactly one full record
    pub fn is_complete(&self) -> bool {
        self.len == FRAME_SIZE
    }

    /// Collected bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Full backing buffer, only meaningful when complete
    pub fn buffer(&self) -> &[u8; FRAME_SIZE] {
        &self.bytes
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn unfilled_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.len..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.len = (self.len + n).min(FRAME_SIZE);
    }
}

impl Default for RawFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFrame")
            .field("len", &self.len)
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "pos_x",
            Axis::Y => "pos_y",
            Axis::Z => "pos_z",
        };
        f.write_str(name)
    }
}

/// Typed view of a complete frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMessage {
    /// Fix status, `0x00` means the position was resolved
    pub status: u8,
    /// X position in centimeters
    pub pos_x: i32,
    /// Y position in centimeters
    pub pos_y: i32,
    /// Z position in centimeters
    pub pos_z: i32,
}

impl PositionMessage {
    /// Status code of a valid fix
    pub const STATUS_OK: u8 = 0x00;

    /// Decode the interpreted fields of a full record
    pub fn decode(bytes: &[u8; FRAME_SIZE]) -> Self {
        Self {
            status: bytes[offset::STATUS],
            pos_x: read_i32(bytes, offset::POS_X),
            pos_y: read_i32(bytes, offset::POS_Y),
            pos_z: read_i32(bytes, offset::POS_Z),
        }
    }

    /// Encode into a full record with zeroed reserved bytes
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[offset::STATUS] = self.status;
        bytes[offset::POS_X..offset::POS_X + 4].copy_from_slice(&self.pos_x.to_le_bytes());
        bytes[offset::POS_Z..offset::POS_Z + 4].copy_from_slice(&self.pos_z.to_le_bytes());
        bytes[offset::POS_Y..offset::POS_Y + 4].copy_from_slice(&self.pos_y.to_le_bytes());
        bytes
    }

    /// Raw value of one axis
    pub fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.pos_x,
            Axis::Y => self.pos_y,
            Axis::Z => self.pos_z,
        }
    }
}

fn read_i32(bytes: &[u8; FRAME_SIZE], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Position report handed to the downstream consumer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    /// Monotonic timestamp (microseconds)
    pub timestamp: u64,
    /// X position (m)
    pub pos_x: f32,
    /// Y position (m)
    pub pos_y: f32,
    /// Z position (m)
    pub pos_z: f32,
}

impl PositionReport {
    /// Centimeters per meter on the wire
    pub const SCALE: f32 = 100.0;

    /// Convert an accepted message into meters
    pub fn from_message(msg: &PositionMessage, timestamp: u64) -> Self {
        Self {
            timestamp,
            pos_x: msg.pos_x as f32 / Self::SCALE,
            pos_y: msg.pos_y as f32 / Self::SCALE,
            pos_z: msg.pos_z as f32 / Self::SCALE,
        }
    }
}
