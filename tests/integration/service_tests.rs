//! DeviceService boot, persistence and command handling.

use crate::mock_hw::{MockNvs, QueueTransport, Rig};

use adam::app::api::{
    AppResponse, ConfigurePinRequest, ControlPinRequest, SetNameRequest, StatusResponse,
};
use adam::app::commands::AppCommand;
use adam::app::events::AppEvent;
use adam::app::service::{FIRMWARE_VERSION, MAX_COMMANDS_PER_TICK};
use adam::error::ApiError;
use adam::pin_config::{Command, Role};
use adam::schema::{KEY_DEVICE_NAME, KEY_PIN_CONFIGURED, KEY_PINS, KEY_TRIGGERS};

fn configure(pin: u8, role: Role, name: Option<&str>) -> AppCommand {
    AppCommand::ConfigurePin(ConfigurePinRequest {
        pin,
        role,
        name: name.map(str::to_string),
        button_mode: None,
    })
}

fn control(pin: u8, command: Command, brightness: Option<u8>) -> AppCommand {
    AppCommand::ControlPin(ControlPinRequest {
        pin,
        command,
        brightness,
    })
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn first_boot_writes_factory_defaults() {
    let rig = Rig::boot();
    let store = rig.service.store();
    for key in [KEY_PINS, KEY_PIN_CONFIGURED, KEY_TRIGGERS, KEY_DEVICE_NAME] {
        assert!(store.blob(key).is_some(), "{key} should be persisted");
    }

    let pins = rig.service.pins();
    for i in 0..8u8 {
        assert_eq!(pins.slot(i).unwrap().role(), Some(Role::BinarySensor));
        assert_eq!(rig.service.triggers().mapping(i).unwrap().output, i + 8);
    }
    for i in 8..16u8 {
        assert_eq!(pins.slot(i).unwrap().role(), Some(Role::Light));
    }
    assert_eq!(rig.service.identity().name(), "Adam-A1B2C3");
    assert!(matches!(
        rig.sink.events.first(),
        Some(AppEvent::Booted { configured: 16, .. })
    ));
}

#[test]
fn configuration_survives_reboot() {
    let mut rig = Rig::boot();
    rig.cmd(configure(12, Role::Switch, Some("Pump"))).unwrap();
    rig.cmd(control(12, Command::On, None)).unwrap();
    rig.cmd(AppCommand::SetDeviceName(SetNameRequest {
        name: "Garage".into(),
    }))
    .unwrap();

    let rig = rig.reboot();
    let slot = rig.service.pins().slot(12).unwrap();
    assert_eq!(slot.role(), Some(Role::Switch));
    assert_eq!(slot.label(), "Pump");
    assert_eq!(slot.logical_state(), Some(true));
    assert_eq!(rig.service.identity().name(), "Garage");
    // Boot drives outputs from the stored table.
    assert!(rig.io.outputs[12]);
}

#[test]
fn wrong_sized_blob_is_treated_as_missing() {
    let mut store = MockNvs::new();
    store.blobs.insert(KEY_PINS.into(), vec![0u8; 7]);
    store.blobs.insert(KEY_TRIGGERS.into(), vec![0xAA; 3]);
    let rig = Rig::boot_with(store);
    assert_eq!(
        rig.service.pins().slot(0).unwrap().role(),
        Some(Role::BinarySensor)
    );
    assert_eq!(rig.service.triggers().mapping(0).unwrap().output, 8);
}

#[test]
fn failing_storage_does_not_fail_requests() {
    let store = MockNvs {
        fail_saves: true,
        ..Default::default()
    };
    let mut rig = Rig::boot_with(store);
    assert!(rig.cmd(control(9, Command::On, Some(40))).is_ok());
    assert!(rig.io.outputs[9]);
}

// ── Info / naming ─────────────────────────────────────────────

#[test]
fn device_info_reports_identity_and_network() {
    let mut rig = Rig::boot();
    rig.sys.ip = Some([192, 168, 1, 40]);
    let Ok(AppResponse::Info(info)) = rig.cmd(AppCommand::GetInfo) else {
        panic!("expected info");
    };
    assert_eq!(info.mac.as_str(), "24:6F:28:A1:B2:C3");
    assert_eq!(info.ip.as_deref(), Some("192.168.1.40"));
    assert_eq!(info.firmware_version, FIRMWARE_VERSION);
    assert_eq!(info.pin_count, 16);
    assert_eq!(info.model, "Adam");
    assert_eq!(info.manufacturer, "IoTiX");
}

#[test]
fn rename_trims_and_rejects_blank() {
    let mut rig = Rig::boot();
    let err = rig
        .cmd(AppCommand::SetDeviceName(SetNameRequest { name: "   ".into() }))
        .unwrap_err();
    assert_eq!(err, ApiError::EmptyName);
    assert_eq!(rig.service.identity().name(), "Adam-A1B2C3");

    rig.cmd(AppCommand::SetDeviceName(SetNameRequest {
        name: "  Hall  ".into(),
    }))
    .unwrap();
    assert_eq!(rig.service.identity().name(), "Hall");
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::Renamed(n) if n.as_str() == "Hall")));
}

// ── Pins ──────────────────────────────────────────────────────

#[test]
fn available_pins_lists_every_channel() {
    let mut rig = Rig::boot();
    let Ok(AppResponse::AvailablePins { pins }) = rig.cmd(AppCommand::ListAvailablePins) else {
        panic!("expected pin list");
    };
    assert_eq!(pins.len(), 16);
    assert!(pins.iter().all(|p| p.configured));
}

#[test]
fn configure_out_of_range_pin_is_rejected() {
    let mut rig = Rig::boot();
    let err = rig.cmd(configure(16, Role::Light, None)).unwrap_err();
    assert_eq!(err, ApiError::OutOfRange(16));
}

#[test]
fn reconfiguring_output_drives_it_low() {
    let mut rig = Rig::boot();
    rig.cmd(control(10, Command::On, None)).unwrap();
    assert!(rig.io.outputs[10]);
    rig.cmd(configure(10, Role::Cover, None)).unwrap();
    assert!(!rig.io.outputs[10]);
    assert_eq!(rig.service.pins().slot(10).unwrap().label(), "Output 11");
}

#[test]
fn driving_a_sensor_is_rejected() {
    let mut rig = Rig::boot();
    let err = rig.cmd(control(2, Command::On, None)).unwrap_err();
    assert_eq!(err, ApiError::InvalidRole(2));
    assert!(rig.io.writes.iter().all(|&(line, _)| line != 2));
}

#[test]
fn light_brightness_is_kept_across_off() {
    let mut rig = Rig::boot();
    rig.cmd(control(8, Command::On, Some(128))).unwrap();
    rig.cmd(control(8, Command::Off, Some(10))).unwrap();
    let Ok(AppResponse::PinState(state)) = rig.cmd(AppCommand::GetPinState { pin: 8 }) else {
        panic!("expected pin state");
    };
    assert!(!state.state);
    assert_eq!(state.brightness, Some(128));
}

#[test]
fn sensor_state_is_read_live() {
    let mut rig = Rig::boot();
    rig.io.set_input(4, true);
    let Ok(AppResponse::PinState(state)) = rig.cmd(AppCommand::GetPinState { pin: 4 }) else {
        panic!("expected pin state");
    };
    assert!(state.state);
    assert_eq!(state.brightness, None);
}

#[test]
fn pin_config_reports_input_settings_for_sensors_only() {
    let mut rig = Rig::boot();
    let Ok(AppResponse::PinConfig { pins }) = rig.cmd(AppCommand::GetPinConfig) else {
        panic!("expected pin config");
    };
    assert_eq!(pins.len(), 16);
    let sensor = &pins[3];
    assert!(sensor.is_input);
    assert_eq!(sensor.input.unwrap().trigger_output, 11);
    assert!(pins[11].input.is_none());
}

// ── Transport ─────────────────────────────────────────────────

#[test]
fn service_commands_caps_per_tick() {
    let mut rig = Rig::boot();
    let mut port = QueueTransport::with((0..6).map(|_| AppCommand::GetInfo));
    let handled = rig
        .service
        .service_commands(&mut port, &mut rig.io, &rig.sys, &mut rig.sink);
    assert_eq!(handled, MAX_COMMANDS_PER_TICK);
    assert_eq!(port.pending.len(), 6 - MAX_COMMANDS_PER_TICK);
    assert_eq!(port.replies.len(), MAX_COMMANDS_PER_TICK);
}

#[test]
fn service_commands_replies_with_errors() {
    let mut rig = Rig::boot();
    let mut port = QueueTransport::with([
        control(3, Command::On, None),
        control(9, Command::On, None),
    ]);
    rig.service
        .service_commands(&mut port, &mut rig.io, &rig.sys, &mut rig.sink);
    assert_eq!(port.replies[0], Err(ApiError::InvalidRole(3)));
    assert_eq!(
        port.replies[1],
        Ok(AppResponse::Status(StatusResponse::OK))
    );
}
