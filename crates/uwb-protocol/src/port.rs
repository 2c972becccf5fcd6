//! Serial Port Setup
//!
//! Opens the device the module is attached to. The module firmware is
//! locked to 115200 baud; other table values are accepted so hosts can pass
//! the same baud argument they pass to other serial drivers.

use crate::error::UwbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{info, warn};

/// Baud rate the module firmware runs at
pub const DEFAULT_BAUD: u32 = 115200;

/// Supported baud rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
    B460800,
    B500000,
    B921600,
}

impl BaudRate {
    /// Get the rate in bits per second
    pub fn as_u32(&self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
            BaudRate::B460800 => 460800,
            BaudRate::B500000 => 500000,
            BaudRate::B921600 => 921600,
        }
    }

    /// Check if this is the rate the module firmware expects
    pub fn is_default(&self) -> bool {
        self.as_u32() == DEFAULT_BAUD
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate::B115200
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = UwbError;

    fn try_from(rate: u32) -> Result<Self, Self::Error> {
        match rate {
            9600 => Ok(BaudRate::B9600),
            19200 => Ok(BaudRate::B19200),
            38400 => Ok(BaudRate::B38400),
            57600 => Ok(BaudRate::B57600),
            115200 => Ok(BaudRate::B115200),
            460800 => Ok(BaudRate::B460800),
            500000 => Ok(BaudRate::B500000),
            921600 => Ok(BaudRate::B921600),
            other => Err(UwbError::InvalidBaudRate(other)),
        }
    }
}

impl From<BaudRate> for u32 {
    fn from(baud: BaudRate) -> Self {
        baud.as_u32()
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Serial port settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    /// Serial port device path (e.g., "/dev/ttyS2")
    pub device: String,
    /// Line rate
    pub baud: BaudRate,
}

impl PortConfig {
    /// Validate the baud rate and build a port config
    pub fn new(device: impl Into<String>, baud_rate: u32) -> Result<Self, UwbError> {
        let device = device.into();
        if device.is_empty() {
            return Err(UwbError::Config("device name not provided".to_string()));
        }

        let baud = BaudRate::try_from(baud_rate)?;
        if !baud.is_default() {
            warn!(
                "Starting UWB driver with baudrate other than default {}",
                DEFAULT_BAUD
            );
        }

        Ok(Self { device, baud })
    }
}

/// Open and configure the serial device (8N1, raw, no flow control)
pub fn open_port(config: &PortConfig) -> Result<SerialStream, UwbError> {
    info!("Opening {} at {} baud", config.device, config.baud);

    tokio_serial::new(&config.device, config.baud.as_u32())
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open_native_async()
        .map_err(|source| UwbError::PortOpen {
            device: config.device.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baud_table() {
        for rate in [9600u32, 19200, 38400, 57600, 115200, 460800, 500000, 921600] {
            let baud = BaudRate::try_from(rate).unwrap();
            assert_eq!(baud.as_u32(), rate);
        }
    }

    #[test]
    fn test_invalid_baud_rejected() {
        for rate in [0u32, 4800, 115201, 230400, 1_000_000] {
            assert!(matches!(
                BaudRate::try_from(rate),
                Err(UwbError::InvalidBaudRate(r)) if r == rate
            ));
        }
    }

    #[test]
    fn test_non_default_baud_accepted() {
        let config = PortConfig::new("/dev/ttyS2", 9600).unwrap();
        assert_eq!(config.baud, BaudRate::B9600);
        assert!(!config.baud.is_default());
    }

    #[test]
    fn test_missing_device_rejected() {
        assert!(matches!(
            PortConfig::new("", DEFAULT_BAUD),
            Err(UwbError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_open_missing_device_fails() {
        let config = PortConfig::new("/dev/uwb-does-not-exist", DEFAULT_BAUD).unwrap();
        match open_port(&config) {
            Err(UwbError::PortOpen { device, .. }) => assert_eq!(device, "/dev/uwb-does-not-exist"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a device that does not exist"),
        }
    }
}
