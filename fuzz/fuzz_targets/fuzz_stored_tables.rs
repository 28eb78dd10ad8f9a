//! Fuzz target: persisted pin, trigger and XR8 tables
//!
//! Feeds arbitrary bytes to the blob decoders and verifies:
//! - No panics under arbitrary byte inputs
//! - A decoded pin table re-encodes to a table that decodes identically
//! - A decoded trigger table never comes back latched
//! - A decoded XR8 table is stable under re-encoding
//!
//! cargo fuzz run fuzz_stored_tables

#![no_main]

use adam::pin_config::PinConfigStore;
use adam::schema::{CONFIGURED_TABLE_LEN, PIN_TABLE_LEN, TRIGGER_TABLE_LEN, XR8_TABLE_LEN};
use adam::triggers::TriggerEngine;
use adam::xr8::Xr8Registry;
use libfuzzer_sys::fuzz_target;

/// Copy a prefix of `data` into a zero-padded fixed array.
fn fill<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = data.len().min(N);
    out[..n].copy_from_slice(&data[..n]);
    out
}

fuzz_target!(|data: &[u8]| {
    let table: [u8; PIN_TABLE_LEN] = fill(data);
    let flags: [u8; CONFIGURED_TABLE_LEN] = fill(data.get(PIN_TABLE_LEN..).unwrap_or(&[]));
    let triggers: [u8; TRIGGER_TABLE_LEN] = fill(data);
    let xr8: [u8; XR8_TABLE_LEN] = fill(data);

    if let Some(pins) = PinConfigStore::decode(&table, &flags) {
        let (t2, f2) = pins.encode();
        let again = PinConfigStore::decode(&t2, &f2).expect("re-encoded table must decode");
        assert_eq!(again.slots(), pins.slots());
    }

    if let Some(mappings) = TriggerEngine::decode(&triggers) {
        assert!(mappings.iter().all(|m| !m.armed));
    }

    if let Some(registry) = Xr8Registry::decode(&xr8) {
        let bytes = registry.encode();
        let again = Xr8Registry::decode(&bytes).expect("re-encoded table must decode");
        assert_eq!(again.encode(), bytes);
    }
});
