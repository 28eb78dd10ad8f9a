//! Pin-slot table.
//!
//! One [`PinSlot`] per channel.  The role and its role-specific state are
//! a single tagged [`SlotKind`], so a binary sensor simply has no stored
//! state to write and "configured" can never disagree with the role.
//!
//! Every mutation writes the whole table through to storage before
//! returning.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{IoBankPort, StoragePort};
use crate::error::{ApiError, Result};
use crate::pins::PIN_COUNT;
use crate::schema::{
    self, CONFIGURED_TABLE_LEN, KEY_PIN_CONFIGURED, KEY_PINS, PIN_TABLE_LEN, SLOT_RECORD_LEN,
    STR_FIELD_LEN, Text,
};

/// Brightness applied on configure and by trigger-driven light actions.
pub const FULL_BRIGHTNESS: u8 = 255;

// ---------------------------------------------------------------------------
// Roles and commands
// ---------------------------------------------------------------------------

/// Logical function a channel can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Light,
    Switch,
    Cover,
    BinarySensor,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Light, Role::Switch, Role::Cover, Role::BinarySensor];
}

/// Output command accepted by [`PinConfigStore::set_output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    On,
    Off,
}

/// Role plus the state that role carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Unassigned,
    Light { on: bool, brightness: u8 },
    Switch { on: bool },
    Cover { on: bool },
    /// State is always read live from the input bank.
    BinarySensor,
}

impl SlotKind {
    /// Freshly configured kind for `role`: off, full brightness.
    pub fn fresh(role: Role) -> Self {
        match role {
            Role::Light => Self::Light {
                on: false,
                brightness: FULL_BRIGHTNESS,
            },
            Role::Switch => Self::Switch { on: false },
            Role::Cover => Self::Cover { on: false },
            Role::BinarySensor => Self::BinarySensor,
        }
    }

    pub fn role(self) -> Option<Role> {
        match self {
            Self::Unassigned => None,
            Self::Light { .. } => Some(Role::Light),
            Self::Switch { .. } => Some(Role::Switch),
            Self::Cover { .. } => Some(Role::Cover),
            Self::BinarySensor => Some(Role::BinarySensor),
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Unassigned => 0,
            Self::Light { .. } => 1,
            Self::Switch { .. } => 2,
            Self::Cover { .. } => 3,
            Self::BinarySensor => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// PinSlot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSlot {
    index: u8,
    label: Text,
    pub(crate) kind: SlotKind,
}

impl PinSlot {
    fn new(index: u8, role: Role, label: Option<&str>) -> Self {
        let label = match label.map(str::trim) {
            Some(l) if !l.is_empty() => schema::bounded_text(l),
            _ => default_label(index, role),
        };
        Self {
            index,
            label,
            kind: SlotKind::fresh(role),
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn role(&self) -> Option<Role> {
        self.kind.role()
    }

    pub fn is_configured(&self) -> bool {
        self.kind != SlotKind::Unassigned
    }

    pub fn is_binary_sensor(&self) -> bool {
        self.kind == SlotKind::BinarySensor
    }

    /// Configured with a writable (non-sensor) role.
    pub fn is_output(&self) -> bool {
        self.is_configured() && !self.is_binary_sensor()
    }

    /// Stored on/off state; `None` for sensors and unassigned slots.
    pub fn logical_state(&self) -> Option<bool> {
        match self.kind {
            SlotKind::Light { on, .. } | SlotKind::Switch { on } | SlotKind::Cover { on } => {
                Some(on)
            }
            SlotKind::Unassigned | SlotKind::BinarySensor => None,
        }
    }

    pub fn brightness(&self) -> Option<u8> {
        match self.kind {
            SlotKind::Light { brightness, .. } => Some(brightness),
            _ => None,
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = self.kind.tag();
        schema::write_str_field(&mut out[1..1 + STR_FIELD_LEN], &self.label);
        out[1 + STR_FIELD_LEN] = u8::from(self.logical_state().unwrap_or(false));
        out[2 + STR_FIELD_LEN] = self.brightness().unwrap_or(FULL_BRIGHTNESS);
    }

    fn decode(index: u8, record: &[u8], configured: bool) -> Option<Self> {
        let label = schema::read_str_field(&record[1..1 + STR_FIELD_LEN])?;
        let on = record[1 + STR_FIELD_LEN] != 0;
        let brightness = record[2 + STR_FIELD_LEN];
        let kind = match (configured, record[0]) {
            (false, _) | (true, 0) => SlotKind::Unassigned,
            (true, 1) => SlotKind::Light { on, brightness },
            (true, 2) => SlotKind::Switch { on },
            (true, 3) => SlotKind::Cover { on },
            (true, 4) => SlotKind::BinarySensor,
            (true, _) => return None,
        };
        Some(Self { index, label, kind })
    }
}

/// "Input N" for sensors, "Output N" otherwise, N being 1-based.
pub fn default_label(index: u8, role: Role) -> Text {
    let mut label = Text::new();
    use core::fmt::Write;
    let prefix = if role == Role::BinarySensor {
        "Input"
    } else {
        "Output"
    };
    let _ = write!(label, "{} {}", prefix, u16::from(index) + 1);
    label
}

/// Result of [`PinConfigStore::read_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinState {
    pub state: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
}

// ---------------------------------------------------------------------------
// PinConfigStore
// ---------------------------------------------------------------------------

pub struct PinConfigStore {
    slots: [PinSlot; PIN_COUNT],
}

impl PinConfigStore {
    /// Factory partition: channels 0–7 binary sensors, 8–15 lights.
    pub fn defaults() -> Self {
        Self {
            slots: core::array::from_fn(|i| {
                let role = if i < PIN_COUNT / 2 {
                    Role::BinarySensor
                } else {
                    Role::Light
                };
                PinSlot::new(i as u8, role, None)
            }),
        }
    }

    /// Hydrate from storage, or regenerate defaults and persist them.
    pub fn load(store: &mut impl StoragePort) -> Self {
        let mut table = [0u8; PIN_TABLE_LEN];
        let mut flags = [0u8; CONFIGURED_TABLE_LEN];
        let loaded = store.load(KEY_PINS, &mut table).is_ok()
            && store.load(KEY_PIN_CONFIGURED, &mut flags).is_ok();

        if loaded {
            if let Some(pins) = Self::decode(&table, &flags) {
                info!(
                    "PinConfigStore: loaded {} configured pins",
                    pins.slots.iter().filter(|s| s.is_configured()).count()
                );
                return pins;
            }
            warn!("PinConfigStore: stored table is malformed");
        }

        info!("PinConfigStore: no usable table, writing defaults");
        let pins = Self::defaults();
        pins.persist(store);
        pins
    }

    pub fn slot(&self, index: u8) -> Option<&PinSlot> {
        self.slots.get(index as usize)
    }

    pub(crate) fn slot_mut(&mut self, index: u8) -> Option<&mut PinSlot> {
        self.slots.get_mut(index as usize)
    }

    pub fn slots(&self) -> &[PinSlot] {
        &self.slots
    }

    /// Assign `role` (and optionally `label`) to a channel.
    pub fn configure(
        &mut self,
        index: u8,
        role: Role,
        label: Option<&str>,
        io: &mut impl IoBankPort,
        store: &mut impl StoragePort,
    ) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(ApiError::OutOfRange(index))?;
        *slot = PinSlot::new(index, role, label);
        if role != Role::BinarySensor {
            io.write_output(index, false);
        }
        info!("Pin {} configured as {:?} '{}'", index, role, slot.label);
        self.persist(store);
        Ok(())
    }

    /// Drive an output channel on or off.
    pub fn set_output(
        &mut self,
        index: u8,
        command: Command,
        brightness: Option<u8>,
        io: &mut impl IoBankPort,
        store: &mut impl StoragePort,
    ) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(ApiError::InvalidPin(index))?;

        let level = command == Command::On;
        match &mut slot.kind {
            SlotKind::BinarySensor => return Err(ApiError::InvalidRole(index)),
            SlotKind::Unassigned => return Err(ApiError::InvalidPin(index)),
            SlotKind::Light { on, brightness: b } => {
                *on = level;
                if let (true, Some(v)) = (level, brightness) {
                    *b = v;
                }
            }
            SlotKind::Switch { on } | SlotKind::Cover { on } => *on = level,
        }
        io.write_output(index, level);
        self.persist(store);
        Ok(())
    }

    /// Current state: live input level for sensors, stored state otherwise.
    pub fn read_state(&self, index: u8, io: &mut impl IoBankPort) -> Result<PinState> {
        let slot = self
            .slot(index)
            .filter(|s| s.is_configured())
            .ok_or(ApiError::InvalidPin(index))?;
        if slot.is_binary_sensor() {
            return Ok(PinState {
                state: io.read_input(index),
                brightness: None,
            });
        }
        Ok(PinState {
            state: slot.logical_state().unwrap_or(false),
            brightness: slot.brightness(),
        })
    }

    /// Regenerate the factory partition and drive every output low.
    pub fn reset_all(&mut self, io: &mut impl IoBankPort, store: &mut impl StoragePort) {
        *self = Self::defaults();
        for line in 0..PIN_COUNT as u8 {
            io.write_output(line, false);
        }
        self.persist(store);
        info!("PinConfigStore: reset to factory defaults");
    }

    /// Re-drive every output line from stored state (after boot).
    pub fn apply_outputs(&self, io: &mut impl IoBankPort) {
        for slot in &self.slots {
            if slot.is_output() {
                io.write_output(slot.index, slot.logical_state().unwrap_or(false));
            }
        }
    }

    /// Write the slot table and configured flags through to storage.
    pub fn persist(&self, store: &mut impl StoragePort) {
        let (table, flags) = self.encode();
        if let Err(e) = store.save(KEY_PINS, &table) {
            warn!("PinConfigStore: saving pin table failed: {}", e);
        }
        if let Err(e) = store.save(KEY_PIN_CONFIGURED, &flags) {
            warn!("PinConfigStore: saving configured flags failed: {}", e);
        }
    }

    // ── Blob codec ────────────────────────────────────────────

    pub fn encode(&self) -> ([u8; PIN_TABLE_LEN], [u8; CONFIGURED_TABLE_LEN]) {
        let mut table = [0u8; PIN_TABLE_LEN];
        let mut flags = [0u8; CONFIGURED_TABLE_LEN];
        for (i, slot) in self.slots.iter().enumerate() {
            slot.encode(&mut table[i * SLOT_RECORD_LEN..(i + 1) * SLOT_RECORD_LEN]);
            flags[i] = u8::from(slot.is_configured());
        }
        (table, flags)
    }

    pub fn decode(table: &[u8; PIN_TABLE_LEN], flags: &[u8; CONFIGURED_TABLE_LEN]) -> Option<Self> {
        let mut pins = Self::defaults();
        for (i, slot) in pins.slots.iter_mut().enumerate() {
            let record = &table[i * SLOT_RECORD_LEN..(i + 1) * SLOT_RECORD_LEN];
            *slot = PinSlot::decode(i as u8, record, flags[i] != 0)?;
        }
        Some(pins)
    }
}
