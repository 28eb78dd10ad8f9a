//! Error types surfaced to API callers.
//!
//! Every variant is a validation failure: the request referenced a pin
//! that is out of range, unconfigured, or in the wrong role (or an XR8
//! module slot or address that cannot be used), and no state was
//! mutated.  Stale trigger mappings and storage size mismatches are
//! not errors at this layer (see [`crate::triggers`] and
//! [`crate::app::ports::StoragePort`]).
//!
//! All variants are `Copy` so they can be returned from the hot tick path
//! and carried in responses without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// API validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// Pin index is outside `0..PIN_COUNT`.
    OutOfRange(u8),
    /// Pin is out of range or not configured.
    InvalidPin(u8),
    /// Pin is configured, but its role does not accept the operation
    /// (e.g. driving a binary sensor).
    InvalidRole(u8),
    /// Trigger source is not a configured binary sensor.
    InvalidInput(u8),
    /// Trigger target is unconfigured or is a binary sensor.
    InvalidOutput(u8),
    /// Device name is empty or whitespace only.
    EmptyName,
    /// XR8 module slot is outside `0..XR8_MODULE_COUNT`.
    InvalidModule(u8),
    /// XR8 address is outside the jumper-selectable range.
    InvalidAddress(u8),
    /// Another configured XR8 module already uses this address.
    AddressInUse(u8),
}

impl ApiError {
    /// Short machine-readable code for the transport layer.
    pub const fn code(self) -> &'static str {
        match self {
            Self::OutOfRange(_) => "out_of_range",
            Self::InvalidPin(_) => "invalid_pin",
            Self::InvalidRole(_) => "invalid_role",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidOutput(_) => "invalid_output",
            Self::EmptyName => "empty_name",
            Self::InvalidModule(_) => "invalid_module",
            Self::InvalidAddress(_) => "invalid_address",
            Self::AddressInUse(_) => "address_in_use",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(pin) => write!(f, "pin {pin} out of range"),
            Self::InvalidPin(pin) => write!(f, "pin {pin} is not configured"),
            Self::InvalidRole(pin) => write!(f, "pin {pin} is a binary sensor and cannot be driven"),
            Self::InvalidInput(pin) => write!(f, "pin {pin} is not a configured binary sensor input"),
            Self::InvalidOutput(pin) => write!(f, "pin {pin} is not a configured output"),
            Self::EmptyName => write!(f, "device name must not be empty"),
            Self::InvalidModule(id) => write!(f, "XR8 module {id} does not exist"),
            Self::InvalidAddress(addr) => write!(f, "XR8 address 0x{addr:02X} out of range"),
            Self::AddressInUse(addr) => write!(f, "XR8 address 0x{addr:02X} already in use"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Result alias for operations exposed to the transport layer.
pub type Result<T> = core::result::Result<T, ApiError>;
