//! Persisted blob layout.
//!
//! Five fixed-size blobs live in the `adam` NVS namespace.  Each is loaded
//! with an exact length check, so any layout change here makes the old
//! blob "not present" and the owner regenerates and rewrites defaults on
//! the next boot.
//!
//! ```text
//! key        size  record
//! ─────────  ────  ──────────────────────────────────────────────
//! pins        560  16 × [role:1][label:32][state:1][brightness:1]
//! pin_cfg      16  16 × [configured:1]
//! triggers     96  16 × [output:1][armed:1][mode:1][short:1][long:1][double:1]
//! dev_name     32  UTF-8, NUL padded
//! xr8        2064  8 × [configured:1][address:1][8 × relay name:32]
//! ```

use crate::pins::{PIN_COUNT, XR8_MODULE_COUNT, XR8_RELAY_COUNT};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

pub const NAMESPACE: &str = "adam";

pub const KEY_PINS: &str = "pins";
pub const KEY_PIN_CONFIGURED: &str = "pin_cfg";
pub const KEY_TRIGGERS: &str = "triggers";
pub const KEY_DEVICE_NAME: &str = "dev_name";
pub const KEY_XR8: &str = "xr8";

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// Width of every persisted string field (one byte reserved for NUL).
pub const STR_FIELD_LEN: usize = 32;
/// Longest label or name that fits a string field.
pub const MAX_TEXT_LEN: usize = STR_FIELD_LEN - 1;

pub const SLOT_RECORD_LEN: usize = 1 + STR_FIELD_LEN + 1 + 1;
pub const PIN_TABLE_LEN: usize = SLOT_RECORD_LEN * PIN_COUNT;
pub const CONFIGURED_TABLE_LEN: usize = PIN_COUNT;
pub const MAPPING_RECORD_LEN: usize = 6;
pub const TRIGGER_TABLE_LEN: usize = MAPPING_RECORD_LEN * PIN_COUNT;
pub const DEVICE_NAME_LEN: usize = STR_FIELD_LEN;
pub const XR8_RECORD_LEN: usize = 2 + STR_FIELD_LEN * XR8_RELAY_COUNT;
pub const XR8_TABLE_LEN: usize = XR8_RECORD_LEN * XR8_MODULE_COUNT;

/// Bounded text as held in memory.
pub type Text = heapless::String<MAX_TEXT_LEN>;

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Copy `s` into a bounded string, cutting at the last whole character
/// that fits.
pub fn bounded_text(s: &str) -> Text {
    let mut out = Text::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Write `s` NUL-padded into a fixed field.
pub fn write_str_field(field: &mut [u8], s: &str) {
    field.fill(0);
    let n = s.len().min(field.len().saturating_sub(1));
    field[..n].copy_from_slice(&s.as_bytes()[..n]);
}

/// Read a NUL-padded field. `None` if the bytes are not UTF-8.
pub fn read_str_field(field: &[u8]) -> Option<Text> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let s = core::str::from_utf8(&field[..end]).ok()?;
    Some(bounded_text(s))
}
