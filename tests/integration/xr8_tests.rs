//! XR8 relay extension registry through the command surface.

use crate::mock_hw::Rig;

use adam::app::api::{AppResponse, ConfigureXr8Request, RelayName, StatusResponse};
use adam::app::commands::AppCommand;
use adam::app::events::AppEvent;
use adam::error::ApiError;
use adam::schema::KEY_XR8;
use serde_json::{Value, json};

fn claim(module_id: u8, address: u8, names: &[&str]) -> AppCommand {
    AppCommand::ConfigureXr8Module(ConfigureXr8Request {
        module_id,
        address,
        configured: true,
        relays: Some(
            names
                .iter()
                .map(|n| RelayName {
                    name: (*n).to_string(),
                })
                .collect(),
        ),
    })
}

fn list(rig: &mut Rig) -> Value {
    let resp = rig.cmd(AppCommand::ListXr8Modules).unwrap();
    serde_json::from_slice(&resp.to_json()).unwrap()
}

#[test]
fn fresh_device_lists_eight_free_slots() {
    let mut rig = Rig::boot();
    let v = list(&mut rig);
    let modules = v["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 8);
    assert_eq!(modules[0], json!({ "id": 0, "address": 32, "configured": false }));
    assert!(rig.service.store().blob(KEY_XR8).is_some());
}

#[test]
fn claimed_module_lists_its_relays_and_survives_reboot() {
    let mut rig = Rig::boot();
    let names = ["Pump", "Fan", "Heater", "Valve", "Gate", "Lamp", "Siren", "Spare"];
    let resp = rig.cmd(claim(1, 0x22, &names)).unwrap();
    assert_eq!(resp, AppResponse::Status(StatusResponse::OK));
    assert!(rig.sink.events.contains(&AppEvent::Xr8Configured {
        module: 1,
        address: 0x22,
        configured: true,
    }));

    let mut rig = rig.reboot();
    let v = list(&mut rig);
    let m = &v["modules"][1];
    assert_eq!(m["address"], 0x22);
    assert_eq!(m["configured"], true);
    assert_eq!(m["relays"].as_array().unwrap().len(), 8);
    assert_eq!(m["relays"][0], json!({ "name": "Pump" }));
    assert_eq!(m["relays"][7], json!({ "name": "Spare" }));
}

#[test]
fn conflicting_or_out_of_range_requests_are_rejected() {
    let mut rig = Rig::boot();
    rig.cmd(claim(0, 0x20, &[])).unwrap();
    let saves = rig.service.store().saves;

    assert_eq!(
        rig.cmd(claim(3, 0x20, &[])).unwrap_err(),
        ApiError::AddressInUse(0x20)
    );
    assert_eq!(
        rig.cmd(claim(3, 0x30, &[])).unwrap_err(),
        ApiError::InvalidAddress(0x30)
    );
    assert_eq!(
        rig.cmd(claim(8, 0x21, &[])).unwrap_err(),
        ApiError::InvalidModule(8)
    );
    assert_eq!(rig.service.store().saves, saves);
    assert!(!rig.service.xr8().module(3).unwrap().is_configured());
}

#[test]
fn release_and_factory_reset_free_slots() {
    let mut rig = Rig::boot();
    rig.cmd(claim(2, 0x23, &["Door"])).unwrap();
    rig.cmd(claim(4, 0x25, &[])).unwrap();

    rig.cmd(AppCommand::ConfigureXr8Module(ConfigureXr8Request {
        module_id: 2,
        address: 0,
        configured: false,
        relays: None,
    }))
    .unwrap();
    assert!(!rig.service.xr8().module(2).unwrap().is_configured());
    assert!(rig.service.xr8().module(4).unwrap().is_configured());

    rig.cmd(AppCommand::FactoryReset).unwrap();
    assert!(
        rig.service
            .xr8()
            .modules()
            .iter()
            .all(|m| !m.is_configured())
    );
}
