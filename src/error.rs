//! Error types for the sensor pusher

use std::io;

use thiserror::Error;

use crate::transport::Bus;

/// Invalid startup configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Accelerometer type label is empty
    #[error("Accelerometer type is missing (expected ADXL, LIS or MMA)")]
    MissingAccelType,

    /// Sampling interval argument is not an integer
    #[error("Invalid sampling interval: {0:?} is not a number of milliseconds")]
    InvalidInterval(String),
}

/// SPI bus setup or transfer failure
#[derive(Error, Debug)]
pub enum TransportError {
    /// The spidev device could not be opened or configured
    #[error("Failed to open SPI device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The duplex transfer ioctl failed
    #[error("SPI transfer failed on {bus}: {source}")]
    Transfer {
        bus: Bus,
        #[source]
        source: io::Error,
    },
}

/// Error type for sensor pusher operations
#[derive(Error, Debug)]
pub enum PusherError {
    /// Configuration rejected at startup
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// SPI transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Writing to the output stream failed
    #[error("Output stream error: {0}")]
    Output(#[from] io::Error),
}

/// Result type for sensor pusher operations
pub type Result<T> = std::result::Result<T, PusherError>;
