//! SPI transport capability and its Linux spidev implementation
//!
//! The ADC driver only needs one thing from the bus: exchange a fixed-size
//! frame and get the same number of bytes back. [`SpiTransport`] captures
//! that, so the sampling code runs the same against `/dev/spidevX.Y` and
//! against an in-memory double in tests.

use std::fmt::{self, Display};
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use log::trace;

use crate::error::TransportError;

/// Bytes exchanged per conversion (command out, result back)
pub const FRAME_LEN: usize = 2;

/// Bus clock, the MCP3002 maximum at 2.7 V
pub const SPI_SPEED_HZ: u32 = 1_200_000;

/// Transfers slower than this are logged as late. A 2-byte frame at
/// 1.2 MHz takes ~14 µs on the wire.
pub const SLOW_TRANSFER_LIMIT: Duration = Duration::from_millis(10);

/// One SPI frame
pub type Frame = [u8; FRAME_LEN];

/// The two physical converters, one per chip-select line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    /// First converter (X and Y axes)
    Bus0 = 0,
    /// Second converter (Z axis)
    Bus1 = 1,
}

impl Bus {
    pub const ALL: [Bus; 2] = [Bus::Bus0, Bus::Bus1];

    /// Chip-select index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Character device for this chip-select on SPI controller 0
    pub fn device_path(self) -> &'static str {
        match self {
            Bus::Bus0 => "/dev/spidev0.0",
            Bus::Bus1 => "/dev/spidev0.1",
        }
    }
}

impl Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SPI bus {} ({})", self.index(), self.device_path())
    }
}

/// Full-duplex frame exchange with one SPI device
pub trait SpiTransport {
    /// Which chip-select this transport talks to
    fn bus(&self) -> Bus;

    /// Clock out `tx` and return the bytes clocked in at the same time
    fn transfer(&mut self, tx: Frame) -> Result<Frame, TransportError>;
}

/// spidev-backed transport
pub struct SpidevTransport {
    spi: Spidev,
    bus: Bus,
}

impl SpidevTransport {
    /// Open and configure the spidev device for `bus`
    pub fn open(bus: Bus, speed_hz: u32) -> Result<Self, TransportError> {
        let open_error = |source: std::io::Error| TransportError::Open {
            path: bus.device_path().to_string(),
            source,
        };

        let mut spi = Spidev::open(bus.device_path()).map_err(open_error)?;
        spi.configure(&SpidevOptions {
            spi_mode: Some(SpiModeFlags::SPI_MODE_0),
            bits_per_word: Some(8),
            max_speed_hz: Some(speed_hz),
            lsb_first: Some(false),
        })
        .map_err(open_error)?;

        Ok(Self { spi, bus })
    }

    /// Open at the standard clock
    pub fn open_default(bus: Bus) -> Result<Self, TransportError> {
        Self::open(bus, SPI_SPEED_HZ)
    }

    /// Raw file descriptor of the open device, for diagnostics
    pub fn raw_fd(&self) -> i32 {
        self.spi.as_raw_fd()
    }
}

impl SpiTransport for SpidevTransport {
    fn bus(&self) -> Bus {
        self.bus
    }

    fn transfer(&mut self, tx: Frame) -> Result<Frame, TransportError> {
        let mut rx = [0u8; FRAME_LEN];

        {
            let mut transfer = SpidevTransfer::read_write(&tx, &mut rx);
            self.spi
                .transfer(&mut transfer)
                .map_err(|source| TransportError::Transfer {
                    bus: self.bus,
                    source,
                })?;
        }

        trace!("{}: tx {:02X?} rx {:02X?}", self.bus, tx, rx);

        Ok(rx)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_device_paths() {
        assert_eq!(Bus::Bus0.device_path(), "/dev/spidev0.0");
        assert_eq!(Bus::Bus1.device_path(), "/dev/spidev0.1");
        assert_eq!(Bus::Bus1.index(), 1);
    }

    #[test]
    fn test_bus_display_names_device() {
        assert_eq!(Bus::Bus0.to_string(), "SPI bus 0 (/dev/spidev0.0)");
    }

    #[test]
    fn test_open_missing_device_reports_path() {
        // No spidev nodes exist in CI containers; on a Pi this test is skipped
        if std::path::Path::new(Bus::Bus0.device_path()).exists() {
            return;
        }
        match SpidevTransport::open_default(Bus::Bus0) {
            Err(TransportError::Open { path, .. }) => assert_eq!(path, "/dev/spidev0.0"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a device that does not exist"),
        }
    }
}
