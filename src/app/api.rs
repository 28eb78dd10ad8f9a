//! Wire shapes for the local HTTP/JSON API.
//!
//! Field names are the ones discovery and home-automation clients already
//! speak (`pin`, `type`, `inputPin`, `eventType`, ...), so every struct
//! here carries explicit serde renames instead of following Rust naming.
//! Request bodies are deserialised leniently: unknown fields are ignored
//! and optional fields may be absent.

use serde::{Deserialize, Serialize};

use crate::pin_config::{Command, PinState, Role};
use crate::schema::Text;
use crate::triggers::{ButtonEventRecord, ButtonMode};

pub const MODEL: &str = "Adam";
pub const MANUFACTURER: &str = "IoTiX";

// ───────────────────────────────────────────────────────────────
// Requests
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePinRequest {
    pub pin: u8,
    #[serde(rename = "type")]
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub button_mode: Option<ButtonMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ControlPinRequest {
    pub pin: u8,
    pub command: Command,
    #[serde(default)]
    pub brightness: Option<u8>,
}

/// Either a classic mapping (`outputPin`) or push-button mappings
/// (`shortPressOutput` / `longPressOutput` / `doublePressOutput`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTriggerRequest {
    pub input_pin: u8,
    #[serde(default)]
    pub output_pin: Option<u8>,
    #[serde(default)]
    pub short_press_output: Option<u8>,
    #[serde(default)]
    pub long_press_output: Option<u8>,
    #[serde(default)]
    pub double_press_output: Option<u8>,
}

impl SetTriggerRequest {
    pub fn is_push(&self) -> bool {
        self.short_press_output.is_some()
            || self.long_press_output.is_some()
            || self.double_press_output.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetNameRequest {
    pub name: String,
}

/// Claim, update or release an XR8 module slot.  `relays`, when present,
/// names the relays in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureXr8Request {
    pub module_id: u8,
    #[serde(default)]
    pub address: u8,
    pub configured: bool,
    #[serde(default)]
    pub relays: Option<Vec<RelayName>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayName {
    pub name: String,
}

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: Text,
    pub mac: heapless::String<17>,
    pub ip: Option<heapless::String<15>>,
    pub firmware_version: &'static str,
    pub chip: &'static str,
    pub pin_count: u8,
    pub model: &'static str,
    pub manufacturer: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailablePin {
    pub pin: u8,
    pub configured: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Text>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinConfigEntry {
    pub pin: u8,
    #[serde(rename = "type")]
    pub role: Role,
    pub name: Text,
    pub is_input: bool,
    pub state: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(flatten)]
    pub input: Option<InputSettings>,
}

/// Trigger settings reported alongside a binary-sensor pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSettings {
    pub button_mode: ButtonMode,
    pub trigger_output: u8,
    pub short_press_output: u8,
    pub long_press_output: u8,
    pub double_press_output: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEntry {
    pub input_pin: u8,
    pub input_name: Text,
    /// `255` when unmapped.
    pub output_pin: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<Text>,
    pub button_mode: ButtonMode,
    pub short_press_output: u8,
    pub long_press_output: u8,
    pub double_press_output: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Xr8ModuleEntry {
    pub id: u8,
    pub address: u8,
    pub configured: bool,
    /// Empty for a free slot.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relays: Vec<RelayName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub const OK: Self = Self { status: "ok" };
    pub const RESET_COMPLETE: Self = Self {
        status: "reset complete",
    };
}

/// Body returned with a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// Every successful response the service can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AppResponse {
    Info(DeviceInfo),
    AvailablePins { pins: Vec<AvailablePin> },
    PinConfig { pins: Vec<PinConfigEntry> },
    PinState(PinState),
    Triggers { triggers: Vec<TriggerEntry> },
    ButtonEvents { events: Vec<ButtonEventRecord> },
    Xr8Modules { modules: Vec<Xr8ModuleEntry> },
    Status(StatusResponse),
}

impl AppResponse {
    pub fn to_json(&self) -> Vec<u8> {
        // Serialising these plain structs into memory cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}
