//! Trigger sweep: classic latch, push-button gestures, stale targets.

use crate::mock_hw::{AFTER_WINDOW_MS, Rig};

use adam::app::api::{AppResponse, ConfigurePinRequest, SetTriggerRequest};
use adam::app::commands::AppCommand;
use adam::app::events::AppEvent;
use adam::drivers::button::ButtonEvent;
use adam::error::ApiError;
use adam::pin_config::Role;
use adam::pins::NO_OUTPUT;
use adam::triggers::{ButtonEventRecord, ButtonMode, StaleTarget};

const T0: u64 = AFTER_WINDOW_MS;

fn configure(rig: &mut Rig, pin: u8, role: Role, button_mode: Option<ButtonMode>) {
    rig.cmd(AppCommand::ConfigurePin(ConfigurePinRequest {
        pin,
        role,
        name: None,
        button_mode,
    }))
    .unwrap();
}

fn classic(input_pin: u8, output_pin: u8) -> AppCommand {
    AppCommand::SetTrigger(SetTriggerRequest {
        input_pin,
        output_pin: Some(output_pin),
        short_press_output: None,
        long_press_output: None,
        double_press_output: None,
    })
}

fn fired(rig: &Rig) -> usize {
    rig.sink
        .count(|e| matches!(e, AppEvent::TriggerFired { .. }))
}

// ── Classic mode ──────────────────────────────────────────────

#[test]
fn held_input_fires_exactly_once() {
    let mut rig = Rig::boot();
    rig.io.set_input(0, true);
    rig.run(T0, T0 + 2_000);

    assert_eq!(fired(&rig), 1);
    let light = rig.service.pins().slot(8).unwrap();
    assert_eq!(light.logical_state(), Some(true));
    assert_eq!(light.brightness(), Some(255));
    assert!(rig.io.outputs[8]);
}

#[test]
fn each_activation_toggles_a_switch() {
    let mut rig = Rig::boot();
    configure(&mut rig, 9, Role::Switch, None);
    rig.cmd(classic(1, 9)).unwrap();

    rig.io.set_input(1, true);
    rig.run(T0, T0 + 100);
    assert!(rig.io.outputs[9]);

    rig.io.set_input(1, false);
    rig.run(T0 + 100, T0 + 200);
    assert!(rig.io.outputs[9], "release must not fire");

    rig.io.set_input(1, true);
    rig.run(T0 + 200, T0 + 300);
    assert!(!rig.io.outputs[9]);
    assert_eq!(fired(&rig), 2);
}

#[test]
fn latch_restarts_unarmed_after_reboot() {
    let mut rig = Rig::boot();
    rig.io.set_input(0, true);
    rig.run(T0, T0 + 100);
    assert_eq!(fired(&rig), 1);

    let mut rig = rig.reboot();
    rig.io.set_input(0, true);
    rig.run(T0, T0 + 100);
    assert_eq!(fired(&rig), 1, "held input fires once after reboot");
}

#[test]
fn stale_target_is_rejected_and_consumes_activation() {
    let mut rig = Rig::boot();
    configure(&mut rig, 10, Role::BinarySensor, None);
    let writes_before = rig.io.writes.len();

    rig.io.set_input(2, true);
    rig.run(T0, T0 + 500);

    let rejected: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::TriggerRejected { .. }))
        .collect();
    assert_eq!(
        rejected,
        vec![&AppEvent::TriggerRejected {
            input: 2,
            target: 10,
            reason: StaleTarget::Sensor,
        }]
    );
    assert_eq!(rig.io.writes.len(), writes_before);
}

#[test]
fn outputs_are_not_swept_as_inputs() {
    let mut rig = Rig::boot();
    rig.io.set_input(12, true);
    rig.run(T0, T0 + 500);
    assert_eq!(fired(&rig), 0);
}

#[test]
fn set_trigger_validates_both_ends() {
    let mut rig = Rig::boot();
    assert_eq!(
        rig.cmd(classic(0, NO_OUTPUT)).unwrap_err(),
        ApiError::InvalidOutput(NO_OUTPUT)
    );
    assert_eq!(
        rig.cmd(classic(9, 10)).unwrap_err(),
        ApiError::InvalidInput(9)
    );
    assert_eq!(
        rig.cmd(classic(0, 3)).unwrap_err(),
        ApiError::InvalidOutput(3)
    );
    assert_eq!(rig.service.triggers().mapping(0).unwrap().output, 8);
}

#[test]
fn combined_request_with_one_bad_target_changes_nothing() {
    let mut rig = Rig::boot();
    configure(&mut rig, 9, Role::Switch, None);
    let saves = rig.service.store().saves;

    let err = rig
        .cmd(AppCommand::SetTrigger(SetTriggerRequest {
            input_pin: 0,
            output_pin: Some(9),
            short_press_output: Some(3),
            long_press_output: None,
            double_press_output: None,
        }))
        .unwrap_err();
    assert_eq!(err, ApiError::InvalidOutput(3));

    let m = rig.service.triggers().mapping(0).unwrap();
    assert_eq!(m.output, 8);
    assert_eq!(m.push.short, NO_OUTPUT);
    assert_eq!(rig.service.store().saves, saves);

    // The same request with a valid gesture target applies both halves.
    rig.cmd(AppCommand::SetTrigger(SetTriggerRequest {
        input_pin: 0,
        output_pin: Some(9),
        short_press_output: Some(10),
        long_press_output: None,
        double_press_output: None,
    }))
    .unwrap();
    let m = rig.service.triggers().mapping(0).unwrap();
    assert_eq!((m.output, m.push.short, m.push.long), (9, 10, NO_OUTPUT));
    assert_eq!(rig.service.store().saves, saves + 1);
}

#[test]
fn reconfigured_input_starts_unlatched() {
    let mut rig = Rig::boot();
    configure(&mut rig, 9, Role::Switch, None);
    rig.cmd(classic(0, 9)).unwrap();
    rig.io.set_input(0, true);
    rig.run(T0, T0 + 100);
    assert_eq!(fired(&rig), 1);
    assert!(rig.service.triggers().mapping(0).unwrap().armed);

    // Away from binary sensor and back, with the line released meanwhile
    // but never swept.
    configure(&mut rig, 0, Role::Switch, None);
    rig.io.set_input(0, false);
    configure(&mut rig, 0, Role::BinarySensor, None);
    assert!(!rig.service.triggers().mapping(0).unwrap().armed);

    rig.io.set_input(0, true);
    rig.run(T0 + 100, T0 + 200);
    assert_eq!(fired(&rig), 2);
}

#[test]
fn trigger_list_names_targets() {
    let mut rig = Rig::boot();
    configure(&mut rig, 15, Role::BinarySensor, None);
    let Ok(AppResponse::Triggers { triggers }) = rig.cmd(AppCommand::ListTriggers) else {
        panic!("expected trigger list");
    };
    // Eight default inputs plus the new one.
    assert_eq!(triggers.len(), 9);
    assert_eq!(triggers[0].output_pin, 8);
    assert_eq!(
        triggers[0].output_name.as_ref().map(|n| n.as_str()),
        Some("Output 9")
    );
    let new_input = triggers.iter().find(|t| t.input_pin == 15).unwrap();
    assert_eq!(new_input.output_pin, NO_OUTPUT);
    assert!(new_input.output_name.is_none());
}

// ── Push mode ─────────────────────────────────────────────────

fn push_rig() -> Rig {
    let mut rig = Rig::boot();
    configure(&mut rig, 5, Role::BinarySensor, Some(ButtonMode::Push));
    configure(&mut rig, 13, Role::Switch, None);
    rig.cmd(AppCommand::SetTrigger(SetTriggerRequest {
        input_pin: 5,
        output_pin: None,
        short_press_output: Some(13),
        long_press_output: Some(NO_OUTPUT),
        double_press_output: Some(NO_OUTPUT),
    }))
    .unwrap();
    rig
}

#[test]
fn short_press_fires_push_target_and_queues_event() {
    let mut rig = push_rig();
    rig.io.set_input(5, true);
    rig.run(T0, T0 + 200);
    assert!(!rig.io.outputs[13], "nothing fires before classification");

    rig.io.set_input(5, false);
    rig.run(T0 + 200, T0 + 800);
    assert!(rig.io.outputs[13]);

    let Ok(AppResponse::ButtonEvents { events }) = rig.cmd(AppCommand::GetButtonEvents) else {
        panic!("expected events");
    };
    assert_eq!(
        events,
        vec![ButtonEventRecord {
            input_pin: 5,
            event_type: ButtonEvent::ShortPress,
        }]
    );
    let Ok(AppResponse::ButtonEvents { events }) = rig.cmd(AppCommand::GetButtonEvents) else {
        panic!("expected events");
    };
    assert!(events.is_empty(), "drain empties the queue");
}

#[test]
fn unmapped_gesture_is_queued_without_firing() {
    let mut rig = push_rig();
    rig.io.set_input(5, true);
    rig.run(T0, T0 + 1_500);
    rig.io.set_input(5, false);
    rig.run(T0 + 1_500, T0 + 2_000);

    assert_eq!(rig.service.pending_button_events(), 1);
    assert!(!rig.io.outputs[13]);
    assert_eq!(fired(&rig), 0);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::TriggerRejected { .. })),
        0
    );
    assert!(rig.sink.events.contains(&AppEvent::ButtonGesture {
        input: 5,
        gesture: ButtonEvent::LongPress,
    }));
}

#[test]
fn push_input_ignores_classic_mapping() {
    let mut rig = push_rig();
    // Input 5 still carries its factory classic target, output 13.
    assert_eq!(rig.service.triggers().mapping(5).unwrap().output, 13);
    rig.io.set_input(5, true);
    rig.run(T0, T0 + 40);
    assert_eq!(fired(&rig), 0);
}

#[test]
fn push_mapping_rejects_sensor_targets() {
    let mut rig = push_rig();
    let err = rig
        .cmd(AppCommand::SetTrigger(SetTriggerRequest {
            input_pin: 5,
            output_pin: None,
            short_press_output: Some(13),
            long_press_output: Some(2),
            double_press_output: None,
        }))
        .unwrap_err();
    assert_eq!(err, ApiError::InvalidOutput(2));
}
