//! Device service: the hexagonal core.
//!
//! [`DeviceService`] owns every piece of device state (pin table, trigger
//! engine, identity, reset monitor, button event queue, XR8 registry)
//! together with
//! the storage backend they persist through.  It exposes a clean,
//! hardware-agnostic API.  All other I/O flows through port traits
//! injected at call sites, so the entire service is testable with mock
//! adapters.
//!
//! ```text
//!  IoBankPort ◀──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │        DeviceService          │
//!  SystemPort ───▶ │ pins · triggers · reset · id  │ ◀──▶ StoragePort
//!                  └──────────────────────────────┘
//! ```
//!
//! Each [`tick`](DeviceService::tick) runs the reset-bridge check, then the
//! trigger sweep.  Commands from the transport are handled between ticks,
//! never concurrently with one.

use core::fmt::Write;

use log::{debug, info, warn};

use crate::adapters::device_id::{MacAddress, mac_string};
use crate::config::RuntimeConfig;
use crate::drivers::button::GestureTiming;
use crate::error::Result;
use crate::identity::DeviceIdentity;
use crate::pin_config::{PinConfigStore, PinState, Role};
use crate::pins::{NO_OUTPUT, PIN_COUNT};
use crate::reset_bridge::{BridgeEvent, FactoryResetMonitor, ResetState};
use crate::triggers::{ButtonEventQueue, ButtonEventRecord, ButtonMode, PushOutputs, TriggerEngine};
use crate::xr8::Xr8Registry;

use super::api::{
    AppResponse, AvailablePin, ConfigurePinRequest, ConfigureXr8Request, ControlPinRequest,
    DeviceInfo, InputSettings, MANUFACTURER, MODEL, PinConfigEntry, RelayName, SetTriggerRequest,
    StatusResponse, TriggerEntry, Xr8ModuleEntry,
};
use super::commands::AppCommand;
use super::events::{AppEvent, ResetSource};
use super::ports::{CommandPort, EventSink, IoBankPort, StoragePort, SystemPort};

/// Firmware version reported in device info.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound on transport commands handled per tick.
pub const MAX_COMMANDS_PER_TICK: usize = 4;

/// What the main loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Factory reset completed; the device must restart.
    Restart,
}

// ───────────────────────────────────────────────────────────────
// DeviceService
// ───────────────────────────────────────────────────────────────

pub struct DeviceService<S: StoragePort> {
    store: S,
    pins: PinConfigStore,
    triggers: TriggerEngine,
    identity: DeviceIdentity,
    xr8: Xr8Registry,
    reset: FactoryResetMonitor,
    button_events: ButtonEventQueue,
    config: RuntimeConfig,
    tick_count: u64,
}

impl<S: StoragePort> DeviceService<S> {
    /// Load persisted state (regenerating whatever is missing), drive the
    /// outputs from it and start the reset-bridge window at `now_ms`.
    pub fn boot(
        mut store: S,
        config: RuntimeConfig,
        mac: MacAddress,
        now_ms: u64,
        io: &mut impl IoBankPort,
        sink: &mut impl EventSink,
    ) -> Self {
        let pins = PinConfigStore::load(&mut store);
        let triggers = TriggerEngine::load(&mut store, GestureTiming::from(&config));
        let identity = DeviceIdentity::load(&mut store, mac);
        let xr8 = Xr8Registry::load(&mut store);
        pins.apply_outputs(io);

        let configured = pins.slots().iter().filter(|s| s.is_configured()).count() as u8;
        info!("DeviceService booted as '{}'", identity.name());
        sink.emit(&AppEvent::Booted {
            name: crate::schema::bounded_text(identity.name()),
            configured,
        });

        Self {
            store,
            pins,
            triggers,
            identity,
            xr8,
            reset: FactoryResetMonitor::new(&config, now_ms),
            button_events: ButtonEventQueue::new(),
            config,
            tick_count: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cycle: reset-bridge check → trigger sweep.
    pub fn tick(
        &mut self,
        now_ms: u64,
        io: &mut impl IoBankPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.tick_count += 1;

        // 1. Factory-reset bridge
        match self.reset.poll(now_ms, &self.pins, io) {
            Some(BridgeEvent::HoldStarted) => sink.emit(&AppEvent::ResetHold { held: true }),
            Some(BridgeEvent::HoldReleased { .. }) => {
                sink.emit(&AppEvent::ResetHold { held: false })
            }
            Some(BridgeEvent::Triggered) => {
                self.factory_reset(io, sink, ResetSource::Bridge);
                return TickOutcome::Restart;
            }
            None => {}
        }

        // 2. Trigger sweep
        self.triggers.tick(
            now_ms,
            &mut self.pins,
            io,
            &mut self.store,
            sink,
            &mut self.button_events,
        );

        TickOutcome::Continue
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one external command and build its response.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        io: &mut impl IoBankPort,
        sys: &impl SystemPort,
        sink: &mut impl EventSink,
    ) -> Result<AppResponse> {
        if cmd.is_mutation() {
            info!("Command: {:?}", cmd);
        } else {
            debug!("Command: {:?}", cmd);
        }
        let response = match cmd {
            AppCommand::GetInfo => AppResponse::Info(self.device_info(sys)),
            AppCommand::SetDeviceName(req) => {
                self.set_device_name(&req.name, sink)?;
                AppResponse::Status(StatusResponse::OK)
            }
            AppCommand::ListAvailablePins => AppResponse::AvailablePins {
                pins: self.available_pins(),
            },
            AppCommand::GetPinConfig => AppResponse::PinConfig {
                pins: self.pin_config(io),
            },
            AppCommand::ConfigurePin(req) => {
                self.configure_pin(&req, io, sink)?;
                AppResponse::Status(StatusResponse::OK)
            }
            AppCommand::GetPinState { pin } => AppResponse::PinState(self.pin_state(pin, io)?),
            AppCommand::ControlPin(req) => {
                self.control_pin(req, io, sink)?;
                AppResponse::Status(StatusResponse::OK)
            }
            AppCommand::ListTriggers => AppResponse::Triggers {
                triggers: self.trigger_list(),
            },
            AppCommand::SetTrigger(req) => {
                self.set_trigger(req)?;
                AppResponse::Status(StatusResponse::OK)
            }
            AppCommand::GetButtonEvents => AppResponse::ButtonEvents {
                events: self.drain_button_events(),
            },
            AppCommand::ListXr8Modules => AppResponse::Xr8Modules {
                modules: self.xr8_modules(),
            },
            AppCommand::ConfigureXr8Module(req) => {
                self.configure_xr8(&req, sink)?;
                AppResponse::Status(StatusResponse::OK)
            }
            AppCommand::FactoryReset => {
                self.factory_reset(io, sink, ResetSource::Api);
                AppResponse::Status(StatusResponse::RESET_COMPLETE)
            }
        };
        Ok(response)
    }

    /// Handle the requests a transport has waiting, at most
    /// [`MAX_COMMANDS_PER_TICK`].  Returns how many were handled.
    pub fn service_commands(
        &mut self,
        port: &mut impl CommandPort,
        io: &mut impl IoBankPort,
        sys: &impl SystemPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while handled < MAX_COMMANDS_PER_TICK {
            let Some(cmd) = port.poll_command() else { break };
            let result = self.handle_command(cmd, io, sys, sink);
            if let Err(e) = &result {
                info!("Command rejected: {}", e);
            }
            port.reply(result);
            handled += 1;
        }
        handled
    }

    // ── Operations ────────────────────────────────────────────

    pub fn device_info(&self, sys: &impl SystemPort) -> DeviceInfo {
        let ip = sys.ip_address().map(|[a, b, c, d]| {
            let mut s = heapless::String::<15>::new();
            let _ = write!(s, "{a}.{b}.{c}.{d}");
            s
        });
        DeviceInfo {
            name: crate::schema::bounded_text(self.identity.name()),
            mac: mac_string(self.identity.mac()),
            ip,
            firmware_version: FIRMWARE_VERSION,
            chip: sys.chip_model(),
            pin_count: PIN_COUNT as u8,
            model: MODEL,
            manufacturer: MANUFACTURER,
        }
    }

    pub fn set_device_name(&mut self, name: &str, sink: &mut impl EventSink) -> Result<()> {
        self.identity.set_name(name, &mut self.store)?;
        sink.emit(&AppEvent::Renamed(crate::schema::bounded_text(
            self.identity.name(),
        )));
        Ok(())
    }

    /// Every channel with either its assignment or what it could become.
    pub fn available_pins(&self) -> Vec<AvailablePin> {
        self.pins
            .slots()
            .iter()
            .map(|s| match s.role() {
                Some(role) => AvailablePin {
                    pin: s.index(),
                    configured: true,
                    role: Some(role),
                    name: Some(crate::schema::bounded_text(s.label())),
                    capabilities: Vec::new(),
                },
                None => AvailablePin {
                    pin: s.index(),
                    configured: false,
                    role: None,
                    name: None,
                    capabilities: Role::ALL.to_vec(),
                },
            })
            .collect()
    }

    /// Configured channels with their current state.
    pub fn pin_config(&self, io: &mut impl IoBankPort) -> Vec<PinConfigEntry> {
        let mut entries = Vec::with_capacity(PIN_COUNT);
        for slot in self.pins.slots() {
            let Some(role) = slot.role() else { continue };
            let Ok(state) = self.pins.read_state(slot.index(), io) else {
                continue;
            };
            let input = match self.triggers.mapping(slot.index()) {
                Some(m) if slot.is_binary_sensor() => Some(InputSettings {
                    button_mode: m.mode,
                    trigger_output: m.output,
                    short_press_output: m.push.short,
                    long_press_output: m.push.long,
                    double_press_output: m.push.double,
                }),
                _ => None,
            };
            entries.push(PinConfigEntry {
                pin: slot.index(),
                role,
                name: crate::schema::bounded_text(slot.label()),
                is_input: slot.is_binary_sensor(),
                state: state.state,
                brightness: state.brightness,
                input,
            });
        }
        entries
    }

    pub fn configure_pin(
        &mut self,
        req: &ConfigurePinRequest,
        io: &mut impl IoBankPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.pins
            .configure(req.pin, req.role, req.name.as_deref(), io, &mut self.store)?;
        // A fresh role starts with no activation in progress.
        self.triggers.rearm(req.pin);
        if req.role == Role::BinarySensor {
            let mode = req.button_mode.unwrap_or(ButtonMode::Classic);
            self.triggers
                .set_mode(req.pin, mode, &self.pins, &mut self.store)?;
        }
        sink.emit(&AppEvent::PinConfigured {
            pin: req.pin,
            role: req.role,
        });
        Ok(())
    }

    pub fn pin_state(&self, pin: u8, io: &mut impl IoBankPort) -> Result<PinState> {
        self.pins.read_state(pin, io)
    }

    pub fn control_pin(
        &mut self,
        req: ControlPinRequest,
        io: &mut impl IoBankPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.pins
            .set_output(req.pin, req.command, req.brightness, io, &mut self.store)?;
        let slot = self.pins.slot(req.pin);
        sink.emit(&AppEvent::OutputChanged {
            pin: req.pin,
            on: slot.and_then(|s| s.logical_state()).unwrap_or(false),
            brightness: slot.and_then(|s| s.brightness()),
        });
        Ok(())
    }

    /// One entry per configured binary-sensor input.
    pub fn trigger_list(&self) -> Vec<TriggerEntry> {
        self.pins
            .slots()
            .iter()
            .filter(|s| s.is_binary_sensor())
            .filter_map(|s| {
                let m = self.triggers.mapping(s.index())?;
                let output_name = self
                    .pins
                    .slot(m.output)
                    .filter(|o| o.is_output())
                    .map(|o| crate::schema::bounded_text(o.label()));
                Some(TriggerEntry {
                    input_pin: s.index(),
                    input_name: crate::schema::bounded_text(s.label()),
                    output_pin: m.output,
                    output_name,
                    button_mode: m.mode,
                    short_press_output: m.push.short,
                    long_press_output: m.push.long,
                    double_press_output: m.push.double,
                })
            })
            .collect()
    }

    /// Classic mapping when only `outputPin` is given, push mapping when
    /// any gesture output is given, both when both are.  The whole request
    /// is validated before any of it is applied.
    pub fn set_trigger(&mut self, req: SetTriggerRequest) -> Result<()> {
        let (classic, push) = if req.is_push() {
            let outputs = PushOutputs {
                short: req.short_press_output.unwrap_or(NO_OUTPUT),
                long: req.long_press_output.unwrap_or(NO_OUTPUT),
                double: req.double_press_output.unwrap_or(NO_OUTPUT),
            };
            (req.output_pin, Some(outputs))
        } else {
            (Some(req.output_pin.unwrap_or(NO_OUTPUT)), None)
        };
        self.triggers
            .set_targets(req.input_pin, classic, push, &self.pins, &mut self.store)
    }

    pub fn drain_button_events(&mut self) -> Vec<ButtonEventRecord> {
        self.button_events.drain().into_iter().collect()
    }

    /// Every module slot; relay names only for claimed slots.
    pub fn xr8_modules(&self) -> Vec<Xr8ModuleEntry> {
        self.xr8
            .modules()
            .iter()
            .map(|m| Xr8ModuleEntry {
                id: m.id(),
                address: m.address(),
                configured: m.is_configured(),
                relays: if m.is_configured() {
                    m.relay_names()
                        .map(|name| RelayName { name: name.into() })
                        .collect()
                } else {
                    Vec::new()
                },
            })
            .collect()
    }

    pub fn configure_xr8(
        &mut self,
        req: &ConfigureXr8Request,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let names: Vec<&str> = req
            .relays
            .iter()
            .flatten()
            .map(|r| r.name.as_str())
            .collect();
        self.xr8.configure(
            req.module_id,
            req.address,
            req.configured,
            &names,
            &mut self.store,
        )?;
        sink.emit(&AppEvent::Xr8Configured {
            module: req.module_id,
            address: req.address,
            configured: req.configured,
        });
        Ok(())
    }

    /// Wipe pins, triggers, name and the XR8 registry back to factory
    /// defaults and drive every output low.  Does not restart; the caller
    /// decides.
    pub fn factory_reset(
        &mut self,
        io: &mut impl IoBankPort,
        sink: &mut impl EventSink,
        source: ResetSource,
    ) {
        warn!("Factory reset requested ({:?})", source);
        self.pins.reset_all(io, &mut self.store);
        self.triggers.reset(&mut self.store);
        self.identity.reset(&mut self.store);
        self.xr8.reset(&mut self.store);
        self.button_events.clear();
        sink.emit(&AppEvent::FactoryReset(source));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn pins(&self) -> &PinConfigStore {
        &self.pins
    }

    pub fn triggers(&self) -> &TriggerEngine {
        &self.triggers
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn xr8(&self) -> &Xr8Registry {
        &self.xr8
    }

    pub fn reset_state(&self) -> ResetState {
        self.reset.state()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ticks executed since boot.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Pending button events not yet drained.
    pub fn pending_button_events(&self) -> usize {
        self.button_events.len()
    }
}
