//! Outbound application events.
//!
//! The [`DeviceService`](super::service::DeviceService) and the trigger
//! engine emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them: log to
//! serial, push to a connected client, and so on.

use crate::drivers::button::ButtonEvent;
use crate::pin_config::Role;
use crate::schema::Text;
use crate::triggers::StaleTarget;

/// Who asked for a factory reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetSource {
    /// The reset-bridge was held during the boot window.
    Bridge,
    /// A client called the factory-reset operation.
    Api,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has loaded its state and driven the outputs.
    Booted { name: Text, configured: u8 },

    /// A channel was (re)assigned a role.
    PinConfigured { pin: u8, role: Role },

    /// An output was driven by a client command.
    OutputChanged {
        pin: u8,
        on: bool,
        brightness: Option<u8>,
    },

    /// A trigger fired and the target output changed state.
    TriggerFired { input: u8, output: u8, on: bool },

    /// A trigger fired but its target can no longer be driven.
    TriggerRejected {
        input: u8,
        target: u8,
        reason: StaleTarget,
    },

    /// A push-button input classified a gesture.
    ButtonGesture { input: u8, gesture: ButtonEvent },

    /// The reset bridge started or stopped being held.
    ResetHold { held: bool },

    /// Configuration wiped back to factory defaults.
    FactoryReset(ResetSource),

    /// The device name changed.
    Renamed(Text),

    /// An XR8 module slot was claimed, updated or released.
    Xr8Configured {
        module: u8,
        address: u8,
        configured: bool,
    },
}
