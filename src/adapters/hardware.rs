//! Hardware adapter: bridges the expander banks to [`IoBankPort`].
//!
//! Owns the shared I²C bus and the two PCF8575s on it.  This is the only
//! module in the system that touches the user channels.  It is generic
//! over [`embedded_hal::i2c::I2c`], so on host the same code runs against
//! an in-memory bus.
//!
//! Inputs on the opto bank are pulled up and a closed contact pulls the
//! line to ground, so the adapter inverts the raw sample: an idle board
//! reports every input inactive.
//!
//! Bus errors never reach the domain: a failed input read returns the
//! last good sample and a failed output write keeps the intended level in
//! the output driver's latch, to be pushed again by the next write.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::IoBankPort;
use crate::drivers::pcf8575::Pcf8575;
use crate::pins::{INPUT_BANK_ADDR, OUTPUT_BANK_ADDR};

/// Inputs idle HIGH (pull-ups released); outputs start LOW.
const INPUT_LATCH: u16 = 0xFFFF;
const OUTPUT_LATCH: u16 = 0x0000;

pub struct HardwareAdapter<I: I2c> {
    bus: I,
    inputs: Pcf8575,
    outputs: Pcf8575,
    /// Last successful raw input sample.
    last_inputs: u16,
}

impl<I: I2c> HardwareAdapter<I> {
    pub fn new(bus: I) -> Self {
        Self {
            bus,
            inputs: Pcf8575::new(INPUT_BANK_ADDR, INPUT_LATCH),
            outputs: Pcf8575::new(OUTPUT_BANK_ADDR, OUTPUT_LATCH),
            last_inputs: INPUT_LATCH,
        }
    }

    /// Write both initial latches. Outputs are LOW afterwards.
    pub fn init(&mut self) -> Result<(), I::Error> {
        self.inputs.init(&mut self.bus)?;
        self.outputs.init(&mut self.bus)?;
        log::info!(
            "HardwareAdapter: expanders at 0x{:02X} (in) / 0x{:02X} (out) ready",
            self.inputs.address(),
            self.outputs.address()
        );
        Ok(())
    }

    /// Release the bus (tests).
    pub fn release(self) -> I {
        self.bus
    }
}

// ── IoBankPort implementation ─────────────────────────────────

impl<I: I2c> IoBankPort for HardwareAdapter<I> {
    fn read_input(&mut self, line: u8) -> bool {
        match self.inputs.read(&mut self.bus) {
            Ok(levels) => self.last_inputs = levels,
            Err(e) => warn!("HardwareAdapter: input read failed: {:?}", e),
        }
        // Pulled up when idle: LOW means asserted.
        self.last_inputs & (1 << (line & 0x0F)) == 0
    }

    fn write_output(&mut self, line: u8, high: bool) {
        if let Err(e) = self.outputs.set_line(&mut self.bus, line, high) {
            warn!("HardwareAdapter: output {} write failed: {:?}", line, e);
        }
    }

    fn output_level(&self, line: u8) -> bool {
        self.outputs.latched() & (1 << (line & 0x0F)) != 0
    }
}
