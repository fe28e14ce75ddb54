//! In-memory SPI transport that answers like an MCP3002

use spi_accel_pusher::transport::Frame;
use spi_accel_pusher::{Bus, SpiTransport, TransportError};
use std::cell::Cell;
use std::rc::Rc;

/// Returns the same code for every conversion and counts transfers
pub struct ConstantAdc {
    bus: Bus,
    code: u16,
    transfers: Rc<Cell<usize>>,
}

impl ConstantAdc {
    pub fn new(bus: Bus, code: u16, transfers: Rc<Cell<usize>>) -> Self {
        assert!(code <= 1023, "MCP3002 codes are 10 bits");
        Self {
            bus,
            code,
            transfers,
        }
    }
}

impl SpiTransport for ConstantAdc {
    fn bus(&self) -> Bus {
        self.bus
    }

    fn transfer(&mut self, tx: Frame) -> Result<Frame, TransportError> {
        assert!(
            tx == [0x60, 0x00] || tx == [0x70, 0x00],
            "unexpected command {:02X?}",
            tx
        );
        self.transfers.set(self.transfers.get() + 1);
        Ok([(self.code >> 8) as u8 & 0x03, (self.code & 0xFF) as u8])
    }
}
