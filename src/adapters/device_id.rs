//! Factory MAC address access and formatting.
//!
//! The MAC is the device's stable identity: it is reported in device info
//! (discovery clients key their config entries on it) and its last three
//! bytes form the default device name `Adam-XXYYZZ`.

use core::fmt::Write;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Colon-separated MAC string: "AA:BB:CC:DD:EE:FF".
pub type MacString = heapless::String<17>;

/// Read the factory station MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Uppercase, colon-separated form used on the wire.
pub fn mac_string(mac: &MacAddress) -> MacString {
    let mut s = MacString::new();
    let _ = write!(
        s,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    s
}

/// Last three MAC bytes as uppercase hex, e.g. `EFCAFE`.
pub fn mac_suffix(mac: &MacAddress) -> heapless::String<6> {
    let mut s = heapless::String::<6>::new();
    let _ = write!(s, "{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    s
}
