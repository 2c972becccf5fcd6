//! Ranging Command Definitions

use crate::source::ByteSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Put the module into pure ranging mode
pub const CMD_PURE_RANGING: [u8; 20] = [
    0x8E, 0x00, 0x11, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Stop ranging
pub const CMD_STOP_RANGING: [u8; 20] = [
    0x8E, 0x00, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Commands understood by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangingCommand {
    /// Start streaming position records
    PureRanging,
    /// Stop streaming
    StopRanging,
}

impl RangingCommand {
    /// Get the byte sequence for this command
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            RangingCommand::PureRanging => &CMD_PURE_RANGING,
            RangingCommand::StopRanging => &CMD_STOP_RANGING,
        }
    }
}

/// Write a command once and return the number of bytes written.
///
/// A short or failed write is logged and otherwise ignored.
pub async fn send_command<S>(source: &mut S, command: RangingCommand) -> usize
where
    S: ByteSource + ?Sized,
{
    let bytes = command.as_bytes();
    let written = match source.write_bytes(bytes).await {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to write {:?}: {}", command, e);
            return 0;
        }
    };

    if written < bytes.len() {
        error!("Only wrote {} bytes out of {}.", written, bytes.len());
    } else {
        debug!("Sent {:?}", command);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    /// Source that accepts at most `limit` bytes per write
    struct ShortWriter {
        limit: usize,
        written: Vec<u8>,
    }

    impl ByteSource for ShortWriter {
        async fn read_with_timeout<'a>(
            &'a mut self,
            _buf: &'a mut [u8],
            _wait: Duration,
        ) -> io::Result<Option<usize>> {
            Ok(None)
        }

        async fn write_bytes<'a>(&'a mut self, bytes: &'a [u8]) -> io::Result<usize> {
            let n = bytes.len().min(self.limit);
            self.written.extend_from_slice(&bytes[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_commands_differ_only_in_mode() {
        assert_eq!(CMD_PURE_RANGING.len(), CMD_STOP_RANGING.len());
        assert_eq!(CMD_PURE_RANGING[..3], CMD_STOP_RANGING[..3]);
        assert_ne!(CMD_PURE_RANGING[3], CMD_STOP_RANGING[3]);
        assert_eq!(RangingCommand::PureRanging.as_bytes(), &CMD_PURE_RANGING);
        assert_eq!(RangingCommand::StopRanging.as_bytes(), &CMD_STOP_RANGING);
    }

    #[tokio::test]
    async fn test_send_writes_command_verbatim() {
        let (mut near, mut far) = tokio::io::duplex(64);
        let written = send_command(&mut near, RangingCommand::PureRanging).await;
        assert_eq!(written, CMD_PURE_RANGING.len());

        let mut received = [0u8; 20];
        far.read_exact(&mut received).await.unwrap();
        assert_eq!(received, CMD_PURE_RANGING);
    }

    #[tokio::test]
    async fn test_short_write_is_not_fatal() {
        let mut source = ShortWriter {
            limit: 7,
            written: Vec::new(),
        };
        let written = send_command(&mut source, RangingCommand::StopRanging).await;
        assert_eq!(written, 7);
        assert_eq!(source.written, &CMD_STOP_RANGING[..7]);
    }
}
