//! PCF8575 16-bit quasi-bidirectional I²C port expander.
//!
//! ## Protocol
//!
//! The chip has no registers: a 2-byte write sets the port latch (P00–P07
//! first, then P10–P17) and a 2-byte read returns the pin levels in the
//! same order.  A line latched HIGH is a weak pull-up and can be read as
//! an input; a line latched LOW is actively driven.
//!
//! Both expanders share one bus, so the driver does not own it.  Every
//! call borrows the bus from the [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter).

use embedded_hal::i2c::I2c;

pub struct Pcf8575 {
    address: u8,
    latch: u16,
}

impl Pcf8575 {
    /// `latch` is the level pattern written by [`init`](Self::init).
    pub const fn new(address: u8, latch: u16) -> Self {
        Self { address, latch }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Intended port latch.  Equals the chip's latch once a write has
    /// succeeded since the last change.
    pub fn latched(&self) -> u16 {
        self.latch
    }

    /// Push the initial latch to the chip.
    pub fn init<I: I2c>(&mut self, bus: &mut I) -> Result<(), I::Error> {
        self.write(bus, self.latch)
    }

    /// Read all 16 line levels (bit `n` = line `n`).
    pub fn read<I: I2c>(&mut self, bus: &mut I) -> Result<u16, I::Error> {
        let mut buf = [0u8; 2];
        bus.read(self.address, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Replace the whole port latch.  The new value is kept even if the
    /// transfer fails, so the next write pushes it again.
    pub fn write<I: I2c>(&mut self, bus: &mut I, value: u16) -> Result<(), I::Error> {
        self.latch = value;
        bus.write(self.address, &value.to_le_bytes())
    }

    /// Change one line, leaving the others as latched.
    pub fn set_line<I: I2c>(&mut self, bus: &mut I, line: u8, high: bool) -> Result<(), I::Error> {
        let mask = 1u16 << (line & 0x0F);
        let value = if high {
            self.latch | mask
        } else {
            self.latch & !mask
        };
        self.write(bus, value)
    }
}
