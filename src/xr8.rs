//! XR8 relay extension registry.
//!
//! An XR8 is an eight-relay board on the extension bus, addressed by
//! jumpers in `0x20..=0x27`.  The device keeps one record per module slot
//! (address, whether the slot is in use, a name per relay) so clients can
//! discover the relays and present them next to the built-in outputs.
//!
//! Two configured modules may not share an address.  Releasing a slot
//! (`configured = false`) returns it to its factory record.

use core::fmt::Write;

use log::{info, warn};

use crate::app::ports::StoragePort;
use crate::error::{ApiError, Result};
use crate::pins::{XR8_ADDR_MAX, XR8_ADDR_MIN, XR8_MODULE_COUNT, XR8_RELAY_COUNT};
use crate::schema::{
    self, KEY_XR8, STR_FIELD_LEN, Text, XR8_RECORD_LEN, XR8_TABLE_LEN,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xr8Module {
    id: u8,
    configured: bool,
    address: u8,
    relays: [Text; XR8_RELAY_COUNT],
}

/// `Relay 1` .. `Relay 8`.
fn default_relay_name(relay: usize) -> Text {
    let mut name = Text::new();
    let _ = write!(name, "Relay {}", relay + 1);
    name
}

impl Xr8Module {
    fn unconfigured(id: u8) -> Self {
        Self {
            id,
            configured: false,
            address: XR8_ADDR_MIN,
            relays: core::array::from_fn(default_relay_name),
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn relay_names(&self) -> impl Iterator<Item = &str> {
        self.relays.iter().map(Text::as_str)
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = u8::from(self.configured);
        out[1] = self.address;
        for (name, field) in self.relays.iter().zip(out[2..].chunks_exact_mut(STR_FIELD_LEN)) {
            schema::write_str_field(field, name);
        }
    }

    fn decode(id: u8, record: &[u8]) -> Option<Self> {
        let configured = match record[0] {
            0 => false,
            1 => true,
            _ => return None,
        };
        let address = record[1];
        if configured && !(XR8_ADDR_MIN..=XR8_ADDR_MAX).contains(&address) {
            return None;
        }
        let mut relays: [Text; XR8_RELAY_COUNT] = core::array::from_fn(default_relay_name);
        for (i, field) in record[2..].chunks_exact(STR_FIELD_LEN).enumerate() {
            let name = schema::read_str_field(field)?;
            if !name.is_empty() {
                relays[i] = name;
            }
        }
        Some(Self {
            id,
            configured,
            address,
            relays,
        })
    }
}

pub struct Xr8Registry {
    modules: [Xr8Module; XR8_MODULE_COUNT],
}

impl Xr8Registry {
    pub fn defaults() -> Self {
        Self {
            modules: core::array::from_fn(|i| Xr8Module::unconfigured(i as u8)),
        }
    }

    /// Hydrate from storage, or regenerate defaults and persist them.
    pub fn load(store: &mut impl StoragePort) -> Self {
        let mut table = [0u8; XR8_TABLE_LEN];
        if store.load(KEY_XR8, &mut table).is_ok() {
            if let Some(registry) = Self::decode(&table) {
                info!(
                    "Xr8Registry: loaded, {} module(s) configured",
                    registry.modules.iter().filter(|m| m.configured).count()
                );
                return registry;
            }
            warn!("Xr8Registry: stored table is malformed");
        }
        let registry = Self::defaults();
        registry.persist(store);
        registry
    }

    pub fn modules(&self) -> &[Xr8Module] {
        &self.modules
    }

    pub fn module(&self, id: u8) -> Option<&Xr8Module> {
        self.modules.get(id as usize)
    }

    /// Claim, update or release a module slot.
    ///
    /// `relays` renames relays positionally; relays without a name given
    /// (or given an empty one) keep their current name.
    pub fn configure(
        &mut self,
        id: u8,
        address: u8,
        configured: bool,
        relays: &[&str],
        store: &mut impl StoragePort,
    ) -> Result<()> {
        if id as usize >= XR8_MODULE_COUNT {
            return Err(ApiError::InvalidModule(id));
        }

        if !configured {
            self.modules[id as usize] = Xr8Module::unconfigured(id);
            info!("XR8 module {} released", id);
            self.persist(store);
            return Ok(());
        }

        if !(XR8_ADDR_MIN..=XR8_ADDR_MAX).contains(&address) {
            return Err(ApiError::InvalidAddress(address));
        }
        let clash = self
            .modules
            .iter()
            .any(|m| m.id != id && m.configured && m.address == address);
        if clash {
            return Err(ApiError::AddressInUse(address));
        }

        let module = &mut self.modules[id as usize];
        module.configured = true;
        module.address = address;
        for (slot, name) in module.relays.iter_mut().zip(relays) {
            let name = name.trim();
            if !name.is_empty() {
                *slot = schema::bounded_text(name);
            }
        }
        info!("XR8 module {} at 0x{:02X}", id, address);
        self.persist(store);
        Ok(())
    }

    /// Release every slot.
    pub fn reset(&mut self, store: &mut impl StoragePort) {
        *self = Self::defaults();
        self.persist(store);
    }

    pub fn persist(&self, store: &mut impl StoragePort) {
        if let Err(e) = store.save(KEY_XR8, &self.encode()) {
            warn!("Xr8Registry: saving table failed: {}", e);
        }
    }

    // ── Blob codec ────────────────────────────────────────────

    pub fn encode(&self) -> [u8; XR8_TABLE_LEN] {
        let mut table = [0u8; XR8_TABLE_LEN];
        for (m, out) in self.modules.iter().zip(table.chunks_exact_mut(XR8_RECORD_LEN)) {
            m.encode(out);
        }
        table
    }

    pub fn decode(table: &[u8; XR8_TABLE_LEN]) -> Option<Self> {
        let mut registry = Self::defaults();
        for (i, record) in table.chunks_exact(XR8_RECORD_LEN).enumerate() {
            registry.modules[i] = Xr8Module::decode(i as u8, record)?;
        }
        Some(registry)
    }
}
