//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).

use log::{info, warn};

use crate::app::events::{AppEvent, ResetSource};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Booted { name, configured } => {
                info!("BOOT  | name='{}' | configured={}/16", name, configured);
            }
            AppEvent::PinConfigured { pin, role } => {
                info!("PIN   | {} configured as {:?}", pin, role);
            }
            AppEvent::OutputChanged {
                pin,
                on,
                brightness,
            } => match brightness {
                Some(b) => info!("PIN   | {} -> {} (brightness {})", pin, on_off(*on), b),
                None => info!("PIN   | {} -> {}", pin, on_off(*on)),
            },
            AppEvent::TriggerFired { input, output, on } => {
                info!("TRIG  | in {} -> out {} {}", input, output, on_off(*on));
            }
            AppEvent::TriggerRejected {
                input,
                target,
                reason,
            } => {
                warn!("TRIG  | in {} -> {} rejected: {}", input, target, reason);
            }
            AppEvent::ButtonGesture { input, gesture } => {
                info!("BTN   | in {} {:?}", input, gesture);
            }
            AppEvent::ResetHold { held } => {
                info!("RESET | bridge {}", if *held { "held" } else { "released" });
            }
            AppEvent::FactoryReset(source) => {
                let src = match source {
                    ResetSource::Bridge => "bridge",
                    ResetSource::Api => "api",
                };
                warn!("RESET | factory defaults restored ({})", src);
            }
            AppEvent::Renamed(name) => {
                info!("NAME  | '{}'", name);
            }
            AppEvent::Xr8Configured {
                module,
                address,
                configured: true,
            } => {
                info!("XR8   | module {} at 0x{:02X}", module, address);
            }
            AppEvent::Xr8Configured { module, .. } => {
                info!("XR8   | module {} released", module);
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
