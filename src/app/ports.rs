//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DeviceService (domain)
//! ```
//!
//! Driven adapters (expander banks, NVS, clock, system control, event
//! sinks) and the driving transport adapter implement these traits.  The
//! [`DeviceService`](super::service::DeviceService) consumes them via
//! generics, so the domain core never touches hardware directly and the
//! whole tick can be driven from host tests with in-memory models.

// ───────────────────────────────────────────────────────────────
// I/O bank port (driven adapter: domain ↔ port expanders)
// ───────────────────────────────────────────────────────────────

/// Two independent 16-line banks: an input bank and an output bank.
///
/// Line `n` on each bank belongs to channel `n`.  Inputs are reported
/// as logical levels: `true` means the input is asserted (contact closed,
/// line pulled to ground on the opto bank) and an idle board reads all
/// `false`.  The adapter owns the electrical polarity.  Outputs are
/// driver levels (`true` = energised).
pub trait IoBankPort {
    /// Sample one line of the input bank.  `true` = active.
    fn read_input(&mut self, line: u8) -> bool;

    /// Drive one line of the output bank.
    fn write_output(&mut self, line: u8, high: bool);

    /// Last level written to an output line.
    fn output_level(&self, line: u8) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Fixed-size blob storage under a single namespace.
///
/// Each call is one self-contained session: the backend opens the
/// namespace, performs the operation and releases it before returning.
pub trait StoragePort {
    /// Load the blob stored under `key` into `buf`.
    ///
    /// Succeeds only when the stored length equals `buf.len()` exactly.
    /// An absent key and a length mismatch both yield
    /// [`StorageError::NotFound`]; callers treat either as "not present".
    fn load(&self, key: &str, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write a blob atomically, replacing any previous value.
    fn save(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot.
pub trait ClockPort {
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// System port (chip info, network address, restart)
// ───────────────────────────────────────────────────────────────

/// Platform facts and controls the device-info and reset paths need.
pub trait SystemPort {
    /// Chip model string (e.g. "ESP32-S3").
    fn chip_model(&self) -> &'static str;

    /// Current station IPv4 address, if the network is up.
    fn ip_address(&self) -> Option<[u8; 4]>;

    /// Reboot the device. Does not return on real hardware.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Command port (driving adapter: transport → domain)
// ───────────────────────────────────────────────────────────────

/// A transport that decodes client requests into commands and sends the
/// results back.  The service drains it once per tick, after the trigger
/// sweep.
pub trait CommandPort {
    /// Next decoded request, if one is waiting.
    fn poll_command(&mut self) -> Option<super::commands::AppCommand>;

    /// Deliver the outcome of the most recently polled command.
    fn reply(&mut self, result: crate::error::Result<super::api::AppResponse>);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Key is absent, or the stored blob has a different length.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error from the backend.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "blob not present"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
