//! UWB Positioning Protocol
//!
//! This crate provides async serial communication with UWB ranging modules
//! that stream fixed-size position records with no delimiters. Message
//! boundaries are recovered from inter-byte timing only.

mod command;
mod error;
mod message;
mod port;
mod reader;
mod source;

pub use command::{send_command, RangingCommand, CMD_PURE_RANGING, CMD_STOP_RANGING};
pub use error::UwbError;
pub use message::{Axis, PositionMessage, PositionReport, RawFrame, FRAME_SIZE};
pub use port::{open_port, BaudRate, PortConfig, DEFAULT_BAUD};
pub use reader::{FrameReader, FrameTimeouts, ReadState, BYTE_TIMEOUT, MESSAGE_TIMEOUT};
pub use source::ByteSource;

/// Byte offsets of the interpreted fields inside a frame
pub mod offset {
    /// Fix status (`0x00` = valid)
    pub const STATUS: usize = 0;
    /// X coordinate, centimeters
    pub const POS_X: usize = 1;
    /// Z coordinate, centimeters
    pub const POS_Z: usize = 5;
    /// Y coordinate, centimeters
    pub const POS_Y: usize = 9;
    /// First reserved byte
    pub const RESERVED: usize = 13;
}
