//! UWB Error Types

use thiserror::Error;

/// Errors that can occur while setting up communication with the UWB module
#[derive(Debug, Error)]
pub enum UwbError {
    /// Baud rate outside the supported table
    #[error("{0} is not a valid baud rate")]
    InvalidBaudRate(u32),

    /// Serial device could not be opened or configured
    #[error("could not open {device}: {source}")]
    PortOpen {
        device: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// Invalid driver configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
