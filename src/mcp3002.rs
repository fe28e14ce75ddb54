//! Channel reader for a pair of MCP3002 dual-channel 10-bit ADCs
//!
//! X and Y are wired to CH0 and CH1 of the first converter, Z to CH0 of the
//! second. Each conversion is a single 2-byte duplex transfer:
//!
//! ```text
//! tx = [0b0(start)(sgl)(odd)_(msbf)000, 0b0000_0000]
//! rx = [0bZZZZ_Z(null)(B9)(B8),         0b(B7)..(B0)]
//! ```

use std::fmt::{self, Display};
use std::time::{Duration, Instant};

use log::warn;

use crate::error::TransportError;
use crate::transport::{Bus, Frame, SpiTransport, SLOW_TRANSFER_LIMIT};

/// Single-ended, CH0, MSB-first
const CMD_CH0: Frame = [0x60, 0x00];
/// Single-ended, CH1, MSB-first
const CMD_CH1: Frame = [0x70, 0x00];

/// Accelerometer axis, also the logical channel number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// Read order within a sampling cycle
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Command frame and converter for this axis
    pub fn route(self) -> (Frame, Bus) {
        match self {
            Axis::X => (CMD_CH0, Bus::Bus0),
            Axis::Y => (CMD_CH1, Bus::Bus0),
            Axis::Z => (CMD_CH0, Bus::Bus1),
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        write!(f, "{}", text)
    }
}

/// Both converters, indexed by [`Bus`]
///
/// Every transfer is timed. One that comes back later than the transfer
/// limit is logged and counted, and its data is still used.
pub struct Mcp3002Pair<T: SpiTransport> {
    buses: [T; 2],
    transfer_limit: Duration,
    late_transfers: u64,
}

impl<T: SpiTransport> Mcp3002Pair<T> {
    /// `bus0` serves X and Y, `bus1` serves Z
    pub fn new(bus0: T, bus1: T) -> Self {
        Self {
            buses: [bus0, bus1],
            transfer_limit: SLOW_TRANSFER_LIMIT,
            late_transfers: 0,
        }
    }

    /// Replace the slow-transfer limit
    pub fn with_transfer_limit(mut self, limit: Duration) -> Self {
        self.transfer_limit = limit;
        self
    }

    /// Transfers so far that exceeded the limit
    pub fn late_transfers(&self) -> u64 {
        self.late_transfers
    }

    /// Transport for `bus`
    pub fn transport(&self, bus: Bus) -> &T {
        &self.buses[bus.index()]
    }

    /// Read one raw code (0..=1023) for `axis`
    pub fn read_channel(&mut self, axis: Axis) -> Result<u16, TransportError> {
        let (tx, bus) = axis.route();
        let transport = &mut self.buses[bus.index()];

        let start = Instant::now();
        let rx = transport.transfer(tx)?;
        let elapsed = start.elapsed();

        if elapsed > self.transfer_limit {
            self.late_transfers += 1;
            warn!(
                "{}: {} transfer took {:?}, limit {:?}",
                transport.bus(),
                axis,
                elapsed,
                self.transfer_limit
            );
        }

        Ok(decode(rx))
    }
}

/// Extract the 10-bit result from a response frame
pub fn decode(rx: Frame) -> u16 {
    rx[1] as u16 + (((rx[0] & 0x03) as u16) << 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{frame_for, MockTransport, TransferLog};

    fn pair(bus0: Vec<Frame>, bus1: Vec<Frame>, log: &TransferLog) -> Mcp3002Pair<MockTransport> {
        Mcp3002Pair::new(
            MockTransport::scripted(Bus::Bus0, bus0, log.clone()),
            MockTransport::scripted(Bus::Bus1, bus1, log.clone()),
        )
    }

    #[test]
    fn test_decode_reconstructs_every_code() {
        for code in 0..=1023u16 {
            for high_bits in [0x00u8, 0x04, 0xFC] {
                let rx = [((code >> 8) as u8 & 0x03) | high_bits, (code & 0xFF) as u8];
                assert_eq!(decode(rx), code, "code {} high bits {:#04X}", code, high_bits);
            }
        }
    }

    #[test]
    fn test_decode_ignores_undriven_bits() {
        assert_eq!(decode([0xFF, 0xFF]), 1023);
        assert_eq!(decode([0xFC, 0x00]), 0);
        assert_eq!(decode([0x02, 0x00]), 512);
    }

    #[test]
    fn test_channel_routing() {
        assert_eq!(Axis::X.route(), ([0x60, 0x00], Bus::Bus0));
        assert_eq!(Axis::Y.route(), ([0x70, 0x00], Bus::Bus0));
        assert_eq!(Axis::Z.route(), ([0x60, 0x00], Bus::Bus1));
    }

    #[test]
    fn test_read_channel_uses_one_transfer_on_the_right_bus() {
        let log = TransferLog::default();
        let mut adc = pair(
            vec![frame_for(100), frame_for(200)],
            vec![frame_for(1023)],
            &log,
        );

        assert_eq!(adc.read_channel(Axis::X).unwrap(), 100);
        assert_eq!(adc.read_channel(Axis::Y).unwrap(), 200);
        assert_eq!(adc.read_channel(Axis::Z).unwrap(), 1023);

        assert_eq!(
            *log.borrow(),
            vec![
                (Bus::Bus0, [0x60, 0x00]),
                (Bus::Bus0, [0x70, 0x00]),
                (Bus::Bus1, [0x60, 0x00]),
            ]
        );
    }

    #[test]
    fn test_read_channel_propagates_transfer_failure() {
        let log = TransferLog::default();
        let mut adc = Mcp3002Pair::new(
            MockTransport::constant(Bus::Bus0, frame_for(512), log.clone()),
            MockTransport::failing(Bus::Bus1, log.clone()),
        );

        assert_eq!(adc.read_channel(Axis::X).unwrap(), 512);
        match adc.read_channel(Axis::Z) {
            Err(TransportError::Transfer { bus, .. }) => assert_eq!(bus, Bus::Bus1),
            other => panic!("expected transfer error, got {:?}", other),
        }
    }

    #[test]
    fn test_late_transfer_keeps_data() {
        let log = TransferLog::default();
        let mut adc = Mcp3002Pair::new(
            MockTransport::slow_once(
                Bus::Bus0,
                frame_for(321),
                Duration::from_millis(12),
                log.clone(),
            ),
            MockTransport::constant(Bus::Bus1, frame_for(700), log),
        );

        assert_eq!(adc.read_channel(Axis::X).unwrap(), 321);
        assert_eq!(adc.late_transfers(), 1);
        assert_eq!(adc.read_channel(Axis::Y).unwrap(), 321);
        assert_eq!(adc.read_channel(Axis::Z).unwrap(), 700);
        assert_eq!(adc.late_transfers(), 1);
    }

    #[test]
    fn test_transfer_limit_is_configurable() {
        let log = TransferLog::default();
        let mut adc = Mcp3002Pair::new(
            MockTransport::slow_once(
                Bus::Bus0,
                frame_for(5),
                Duration::from_millis(12),
                log.clone(),
            ),
            MockTransport::constant(Bus::Bus1, frame_for(5), log),
        )
        .with_transfer_limit(Duration::from_secs(1));

        assert_eq!(adc.read_channel(Axis::X).unwrap(), 5);
        assert_eq!(adc.late_transfers(), 0);
    }

    #[test]
    fn test_axis_display() {
        let names: Vec<String> = Axis::ALL.iter().map(|a| a.to_string()).collect();
        assert_eq!(names, ["X", "Y", "Z"]);
    }
}
