//! Driver configuration

use frame_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uwb_protocol::{FrameTimeouts, PortConfig, UwbError, DEFAULT_BAUD};

/// Driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Serial device the module is attached to
    pub device: String,

    /// Baud rate, checked against the supported table at start
    pub baud: u32,

    /// Wait for the first byte of a record (milliseconds)
    pub message_timeout_ms: u64,

    /// Maximum gap inside a record (milliseconds)
    pub byte_timeout_ms: u64,

    /// Frame acceptance rules
    pub validation: ValidationConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let timeouts = FrameTimeouts::default();
        Self {
            device: "/dev/ttyS2".to_string(),
            baud: DEFAULT_BAUD,
            message_timeout_ms: timeouts.message.as_millis() as u64,
            byte_timeout_ms: timeouts.byte.as_millis() as u64,
            validation: ValidationConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Create a config for `device` with default timing
    pub fn new(device: impl Into<String>, baud: u32) -> Self {
        Self {
            device: device.into(),
            baud,
            ..Default::default()
        }
    }

    /// Validated serial settings
    pub fn port_config(&self) -> Result<PortConfig, UwbError> {
        PortConfig::new(self.device.clone(), self.baud)
    }

    /// Framing timeouts
    pub fn timeouts(&self) -> Result<FrameTimeouts, UwbError> {
        if self.byte_timeout_ms == 0 || self.message_timeout_ms == 0 {
            return Err(UwbError::Config("timeouts must be non-zero".to_string()));
        }
        if self.byte_timeout_ms > self.message_timeout_ms {
            return Err(UwbError::Config(format!(
                "byte timeout {}ms exceeds message timeout {}ms",
                self.byte_timeout_ms, self.message_timeout_ms
            )));
        }
        Ok(FrameTimeouts {
            message: Duration::from_millis(self.message_timeout_ms),
            byte: Duration::from_millis(self.byte_timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uwb_protocol::{BaudRate, BYTE_TIMEOUT, MESSAGE_TIMEOUT};

    #[test]
    fn test_defaults_match_module() {
        let config = DriverConfig::default();
        assert_eq!(config.baud, 115200);
        let timeouts = config.timeouts().unwrap();
        assert_eq!(timeouts.message, MESSAGE_TIMEOUT);
        assert_eq!(timeouts.byte, BYTE_TIMEOUT);
    }

    #[test]
    fn test_port_config_validates_baud() {
        assert_eq!(
            DriverConfig::new("/dev/ttyS2", 921600)
                .port_config()
                .unwrap()
                .baud,
            BaudRate::B921600
        );
        assert!(matches!(
            DriverConfig::new("/dev/ttyS2", 12345).port_config(),
            Err(UwbError::InvalidBaudRate(12345))
        ));
    }

    #[test]
    fn test_inverted_timeouts_rejected() {
        let config = DriverConfig {
            message_timeout_ms: 5,
            byte_timeout_ms: 10,
            ..Default::default()
        };
        assert!(config.timeouts().is_err());
    }
}
