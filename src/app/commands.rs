//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the local
//! HTTP API, a serial console) that the
//! [`DeviceService`](super::service::DeviceService) interprets and acts
//! upon.  A transport adapter decodes its requests into these and hands
//! them over through [`CommandPort`](super::ports::CommandPort).

use super::api::{
    ConfigurePinRequest, ConfigureXr8Request, ControlPinRequest, SetNameRequest, SetTriggerRequest,
};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    GetInfo,
    SetDeviceName(SetNameRequest),
    ListAvailablePins,
    GetPinConfig,
    ConfigurePin(ConfigurePinRequest),
    GetPinState { pin: u8 },
    ControlPin(ControlPinRequest),
    ListTriggers,
    SetTrigger(SetTriggerRequest),
    /// Drain queued push-button gestures.
    GetButtonEvents,
    ListXr8Modules,
    ConfigureXr8Module(ConfigureXr8Request),
    /// Wipe pins, triggers, name and XR8 modules.  No confirmation step.
    FactoryReset,
}

impl AppCommand {
    /// True for commands that change persisted state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SetDeviceName(_)
                | Self::ConfigurePin(_)
                | Self::ControlPin(_)
                | Self::SetTrigger(_)
                | Self::ConfigureXr8Module(_)
                | Self::FactoryReset
        )
    }
}
