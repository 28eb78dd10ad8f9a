//! Device name and hardware identity.

use core::fmt::Write;

use log::{info, warn};

use crate::adapters::device_id::{MacAddress, mac_suffix};
use crate::app::ports::StoragePort;
use crate::error::{ApiError, Result};
use crate::schema::{self, DEVICE_NAME_LEN, KEY_DEVICE_NAME, Text};

pub struct DeviceIdentity {
    name: Text,
    mac: MacAddress,
}

/// `Adam-XXYYZZ` from the last three MAC bytes.
pub fn default_name(mac: &MacAddress) -> Text {
    let mut name = Text::new();
    let _ = write!(name, "Adam-{}", mac_suffix(mac));
    name
}

impl DeviceIdentity {
    pub fn new(mac: MacAddress) -> Self {
        Self {
            name: default_name(&mac),
            mac,
        }
    }

    /// Load the stored name, or fall back to the MAC-derived default and
    /// persist it.
    pub fn load(store: &mut impl StoragePort, mac: MacAddress) -> Self {
        let mut field = [0u8; DEVICE_NAME_LEN];
        if store.load(KEY_DEVICE_NAME, &mut field).is_ok() {
            match schema::read_str_field(&field) {
                Some(name) if !name.trim().is_empty() => {
                    info!("Device name: '{}'", name);
                    return Self { name, mac };
                }
                _ => warn!("Device name: stored value unusable"),
            }
        }
        let identity = Self::new(mac);
        info!("Device name: defaulting to '{}'", identity.name);
        identity.persist(store);
        identity
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn mac(&self) -> &MacAddress {
        &self.mac
    }

    /// Rename the device.  Surrounding whitespace is trimmed and the name
    /// is cut to the storable length.
    pub fn set_name(&mut self, name: &str, store: &mut impl StoragePort) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::EmptyName);
        }
        self.name = schema::bounded_text(name);
        info!("Device renamed to '{}'", self.name);
        self.persist(store);
        Ok(())
    }

    /// Back to the MAC-derived default.
    pub fn reset(&mut self, store: &mut impl StoragePort) {
        self.name = default_name(&self.mac);
        self.persist(store);
    }

    pub fn persist(&self, store: &mut impl StoragePort) {
        let mut field = [0u8; DEVICE_NAME_LEN];
        schema::write_str_field(&mut field, &self.name);
        if let Err(e) = store.save(KEY_DEVICE_NAME, &field) {
            warn!("Device name: save failed: {}", e);
        }
    }
}
