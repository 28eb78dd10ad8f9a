//! Board pin assignments for the Adam main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers or bus addresses.
//!
//! The 16 user channels are not MCU GPIOs: they sit behind two PCF8575
//! 16-bit I²C port expanders, one wired to the opto-isolated inputs and
//! one to the output drivers.  Channel `n` is line `n` on both banks.

// ---------------------------------------------------------------------------
// User channels
// ---------------------------------------------------------------------------

/// Number of user-configurable channels.
pub const PIN_COUNT: usize = 16;

/// Persisted sentinel meaning "no output mapped".
pub const NO_OUTPUT: u8 = 255;

// ---------------------------------------------------------------------------
// I²C bus
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Bus clock. Both expanders are rated to 400 kHz.
pub const I2C_FREQ_HZ: u32 = 400_000;

/// 7-bit address of the input-bank expander (A2..A0 = 000).
pub const INPUT_BANK_ADDR: u8 = 0x20;
/// 7-bit address of the output-bank expander (A2..A0 = 001).
pub const OUTPUT_BANK_ADDR: u8 = 0x21;

// ---------------------------------------------------------------------------
// XR8 relay extension modules
// ---------------------------------------------------------------------------

/// Extension modules the device keeps a record for.
pub const XR8_MODULE_COUNT: usize = 8;
/// Relays on one module.
pub const XR8_RELAY_COUNT: usize = 8;
/// 7-bit address range selectable on a module's jumpers (A2..A0).
pub const XR8_ADDR_MIN: u8 = 0x20;
pub const XR8_ADDR_MAX: u8 = 0x27;

// ---------------------------------------------------------------------------
// Factory-reset bridge
// ---------------------------------------------------------------------------

/// Channels that must both be pulled LOW (jumpered to GND) after boot to
/// request a factory reset.  Both then read as active.
pub const RESET_BRIDGE_LINES: (u8, u8) = (0, 1);
