//! Input → output trigger engine.
//!
//! Each input channel carries one [`TriggerMapping`].  In classic mode the
//! input runs a two-state latch:
//!
//! ```text
//!           active && !armed  (fire once)
//!   Idle ─────────────────────────────▶ Latched
//!    ▲                                    │
//!    └────────── inactive ────────────────┘
//! ```
//!
//! "Active" is the logical input level reported by [`IoBankPort::read_input`].
//!
//! In push mode the line is fed to a [`GestureDetector`] instead and each
//! classified gesture fires its own output and is queued for pollers.
//!
//! Targets are resolved at fire time, never at mapping time, so a mapping
//! whose output has since been reconfigured as a sensor is rejected when
//! it fires rather than when it was stored.

use heapless::Deque;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, IoBankPort, StoragePort};
use crate::drivers::button::{ButtonEvent, GestureDetector, GestureTiming};
use crate::error::{ApiError, Result};
use crate::pin_config::{FULL_BRIGHTNESS, PinConfigStore, SlotKind};
use crate::pins::{NO_OUTPUT, PIN_COUNT};
use crate::schema::{KEY_TRIGGERS, MAPPING_RECORD_LEN, TRIGGER_TABLE_LEN};

/// Capacity of the pending button event queue.
pub const BUTTON_EVENT_CAPACITY: usize = 32;

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonMode {
    #[default]
    Classic,
    Push,
}

/// Outputs fired by each push-button gesture (`NO_OUTPUT` = none).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutputs {
    pub short: u8,
    pub long: u8,
    pub double: u8,
}

impl PushOutputs {
    pub const NONE: Self = Self {
        short: NO_OUTPUT,
        long: NO_OUTPUT,
        double: NO_OUTPUT,
    };

    pub fn for_gesture(&self, gesture: ButtonEvent) -> u8 {
        match gesture {
            ButtonEvent::ShortPress => self.short,
            ButtonEvent::LongPress => self.long,
            ButtonEvent::DoublePress => self.double,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMapping {
    /// Classic-mode target, `NO_OUTPUT` when unmapped.
    pub output: u8,
    /// Latched: the current activation has already fired.
    pub armed: bool,
    pub mode: ButtonMode,
    pub push: PushOutputs,
}

impl TriggerMapping {
    const fn unmapped() -> Self {
        Self {
            output: NO_OUTPUT,
            armed: false,
            mode: ButtonMode::Classic,
            push: PushOutputs::NONE,
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = self.output;
        out[1] = u8::from(self.armed);
        out[2] = match self.mode {
            ButtonMode::Classic => 0,
            ButtonMode::Push => 1,
        };
        out[3] = self.push.short;
        out[4] = self.push.long;
        out[5] = self.push.double;
    }

    fn decode(record: &[u8]) -> Option<Self> {
        let mode = match record[2] {
            0 => ButtonMode::Classic,
            1 => ButtonMode::Push,
            _ => return None,
        };
        Some(Self {
            output: record[0],
            // Never trust a persisted latch.
            armed: false,
            mode,
            push: PushOutputs {
                short: record[3],
                long: record[4],
                double: record[5],
            },
        })
    }
}

/// Why a fire was refused.  Mappings are only validated when stored, so
/// these surface at fire time after the target was reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleTarget {
    OutOfRange,
    Unconfigured,
    Sensor,
}

impl core::fmt::Display for StaleTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "target out of range"),
            Self::Unconfigured => write!(f, "target not configured"),
            Self::Sensor => write!(f, "target is a binary sensor"),
        }
    }
}

// ---------------------------------------------------------------------------
// Button event queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonEventRecord {
    pub input_pin: u8,
    pub event_type: ButtonEvent,
}

/// Bounded FIFO of classified gestures awaiting a poller.  When full the
/// oldest entry is dropped.
#[derive(Debug, Default)]
pub struct ButtonEventQueue {
    events: Deque<ButtonEventRecord, BUTTON_EVENT_CAPACITY>,
    dropped: u32,
}

impl ButtonEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ButtonEventRecord) {
        if self.events.is_full() {
            self.events.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Cannot fail: a slot was just freed.
        let _ = self.events.push_back(record);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> heapless::Vec<ButtonEventRecord, BUTTON_EVENT_CAPACITY> {
        let mut out = heapless::Vec::new();
        while let Some(ev) = self.events.pop_front() {
            let _ = out.push(ev);
        }
        out
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

// ---------------------------------------------------------------------------
// Fire policy
// ---------------------------------------------------------------------------

/// Apply one trigger action to `target`.  Returns the new logical state.
///
/// Switch and Cover toggle; Light turns on at full brightness.  On success
/// the line follows the new state and the pin table is persisted.
pub fn fire(
    target: u8,
    pins: &mut PinConfigStore,
    io: &mut impl IoBankPort,
    store: &mut impl StoragePort,
) -> core::result::Result<bool, StaleTarget> {
    let slot = pins.slot_mut(target).ok_or(StaleTarget::OutOfRange)?;
    let level = match &mut slot.kind {
        SlotKind::Unassigned => return Err(StaleTarget::Unconfigured),
        SlotKind::BinarySensor => return Err(StaleTarget::Sensor),
        SlotKind::Light { on, brightness } => {
            *on = true;
            *brightness = FULL_BRIGHTNESS;
            true
        }
        SlotKind::Switch { on } | SlotKind::Cover { on } => {
            *on = !*on;
            *on
        }
    };
    io.write_output(target, level);
    pins.persist(store);
    Ok(level)
}

// ---------------------------------------------------------------------------
// TriggerEngine
// ---------------------------------------------------------------------------

pub struct TriggerEngine {
    mappings: [TriggerMapping; PIN_COUNT],
    detectors: [GestureDetector; PIN_COUNT],
    timing: GestureTiming,
}

impl TriggerEngine {
    /// Factory mapping: input `i` drives output `i + 8` for the lower half,
    /// the upper half is unmapped.
    pub fn defaults(timing: GestureTiming) -> Self {
        Self {
            mappings: core::array::from_fn(|i| {
                let mut m = TriggerMapping::unmapped();
                if i < PIN_COUNT / 2 {
                    m.output = (i + PIN_COUNT / 2) as u8;
                }
                m
            }),
            detectors: [GestureDetector::new(); PIN_COUNT],
            timing,
        }
    }

    /// Hydrate from storage, or regenerate defaults and persist them.
    pub fn load(store: &mut impl StoragePort, timing: GestureTiming) -> Self {
        let mut table = [0u8; TRIGGER_TABLE_LEN];
        if store.load(KEY_TRIGGERS, &mut table).is_ok() {
            if let Some(mappings) = Self::decode(&table) {
                info!("TriggerEngine: loaded mapping table");
                return Self {
                    mappings,
                    detectors: [GestureDetector::new(); PIN_COUNT],
                    timing,
                };
            }
            warn!("TriggerEngine: stored mapping table is malformed");
        }

        info!("TriggerEngine: no usable mapping table, writing defaults");
        let engine = Self::defaults(timing);
        engine.persist(store);
        engine
    }

    pub fn mapping(&self, input: u8) -> Option<&TriggerMapping> {
        self.mappings.get(input as usize)
    }

    pub fn mappings(&self) -> &[TriggerMapping] {
        &self.mappings
    }

    /// Point a classic-mode input at an output.
    pub fn set_mapping(
        &mut self,
        input: u8,
        output: u8,
        pins: &PinConfigStore,
        store: &mut impl StoragePort,
    ) -> Result<()> {
        self.set_targets(input, Some(output), None, pins, store)
    }

    /// Set the three push-button targets of an input. `NO_OUTPUT` clears
    /// a gesture.
    pub fn set_push_mapping(
        &mut self,
        input: u8,
        outputs: PushOutputs,
        pins: &PinConfigStore,
        store: &mut impl StoragePort,
    ) -> Result<()> {
        self.set_targets(input, None, Some(outputs), pins, store)
    }

    /// Update the classic target, the push targets, or both, as one
    /// change.  Every target is checked before anything is applied, so a
    /// rejected request leaves the table and the stored blob untouched.
    pub fn set_targets(
        &mut self,
        input: u8,
        classic: Option<u8>,
        push: Option<PushOutputs>,
        pins: &PinConfigStore,
        store: &mut impl StoragePort,
    ) -> Result<()> {
        Self::check_input(input, pins)?;
        if let Some(output) = classic {
            Self::check_output(output, pins)?;
        }
        if let Some(outputs) = push {
            for target in [outputs.short, outputs.long, outputs.double] {
                if target != NO_OUTPUT {
                    Self::check_output(target, pins)?;
                }
            }
        }

        let m = &mut self.mappings[input as usize];
        if let Some(output) = classic {
            m.output = output;
            info!("Trigger: input {} -> output {}", input, output);
        }
        if let Some(outputs) = push {
            m.push = outputs;
            info!(
                "Trigger: input {} push -> short {} long {} double {}",
                input, outputs.short, outputs.long, outputs.double
            );
        }
        if classic.is_some() || push.is_some() {
            self.persist(store);
        }
        Ok(())
    }

    /// Forget any in-progress activation on `input`: the latch is cleared
    /// and the gesture detector starts from idle.  Not persisted.
    pub fn rearm(&mut self, input: u8) {
        let i = input as usize;
        if i < PIN_COUNT {
            self.mappings[i].armed = false;
            self.detectors[i].reset();
        }
    }

    /// Switch an input between the classic latch and gesture detection.
    pub fn set_mode(
        &mut self,
        input: u8,
        mode: ButtonMode,
        pins: &PinConfigStore,
        store: &mut impl StoragePort,
    ) -> Result<()> {
        Self::check_input(input, pins)?;
        let i = input as usize;
        if self.mappings[i].mode != mode {
            self.mappings[i].mode = mode;
            self.mappings[i].armed = false;
            self.detectors[i].reset();
            debug!("Trigger: input {} mode {:?}", input, mode);
            self.persist(store);
        }
        Ok(())
    }

    /// Back to the factory mapping table.
    pub fn reset(&mut self, store: &mut impl StoragePort) {
        *self = Self::defaults(self.timing);
        self.persist(store);
    }

    /// One sweep over every binary-sensor input.
    pub fn tick(
        &mut self,
        now_ms: u64,
        pins: &mut PinConfigStore,
        io: &mut impl IoBankPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
        queue: &mut ButtonEventQueue,
    ) {
        for input in 0..PIN_COUNT as u8 {
            let is_sensor = pins.slot(input).is_some_and(|s| s.is_binary_sensor());
            if !is_sensor {
                continue;
            }
            let i = input as usize;
            let active = io.read_input(input);

            match self.mappings[i].mode {
                ButtonMode::Classic => {
                    let m = &mut self.mappings[i];
                    if active && !m.armed {
                        // Latch before firing: a rejected fire still
                        // consumes this activation.
                        m.armed = true;
                        let target = m.output;
                        Self::dispatch(input, target, pins, io, store, sink);
                    } else if !active && m.armed {
                        m.armed = false;
                    }
                }
                ButtonMode::Push => {
                    let Some(gesture) = self.detectors[i].tick(active, now_ms, &self.timing) else {
                        continue;
                    };
                    debug!("Trigger: input {} {:?}", input, gesture);
                    sink.emit(&AppEvent::ButtonGesture { input, gesture });
                    queue.push(ButtonEventRecord {
                        input_pin: input,
                        event_type: gesture,
                    });
                    let target = self.mappings[i].push.for_gesture(gesture);
                    Self::dispatch(input, target, pins, io, store, sink);
                }
            }
        }
    }

    fn dispatch(
        input: u8,
        target: u8,
        pins: &mut PinConfigStore,
        io: &mut impl IoBankPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        if target == NO_OUTPUT {
            return;
        }
        match fire(target, pins, io, store) {
            Ok(on) => {
                info!("Trigger: input {} fired output {} -> {}", input, target, on);
                sink.emit(&AppEvent::TriggerFired {
                    input,
                    output: target,
                    on,
                });
            }
            Err(reason) => {
                warn!("Trigger: input {} -> {} rejected: {}", input, target, reason);
                sink.emit(&AppEvent::TriggerRejected {
                    input,
                    target,
                    reason,
                });
            }
        }
    }

    fn check_input(input: u8, pins: &PinConfigStore) -> Result<()> {
        match pins.slot(input) {
            Some(s) if s.is_binary_sensor() => Ok(()),
            _ => Err(ApiError::InvalidInput(input)),
        }
    }

    fn check_output(output: u8, pins: &PinConfigStore) -> Result<()> {
        match pins.slot(output) {
            Some(s) if s.is_output() => Ok(()),
            _ => Err(ApiError::InvalidOutput(output)),
        }
    }

    pub fn persist(&self, store: &mut impl StoragePort) {
        if let Err(e) = store.save(KEY_TRIGGERS, &self.encode()) {
            warn!("TriggerEngine: saving mapping table failed: {}", e);
        }
    }

    // ── Blob codec ────────────────────────────────────────────

    pub fn encode(&self) -> [u8; TRIGGER_TABLE_LEN] {
        let mut table = [0u8; TRIGGER_TABLE_LEN];
        for (m, out) in self
            .mappings
            .iter()
            .zip(table.chunks_exact_mut(MAPPING_RECORD_LEN))
        {
            m.encode(out);
        }
        table
    }

    pub fn decode(table: &[u8; TRIGGER_TABLE_LEN]) -> Option<[TriggerMapping; PIN_COUNT]> {
        let mut mappings = [TriggerMapping::unmapped(); PIN_COUNT];
        for (m, record) in mappings
            .iter_mut()
            .zip(table.chunks_exact(MAPPING_RECORD_LEN))
        {
            *m = TriggerMapping::decode(record)?;
        }
        Some(mappings)
    }
}
