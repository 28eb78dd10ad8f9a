//! Factory-reset bridge monitor.
//!
//! Shorting the two bridge inputs to ground for `reset_hold_ms` within
//! `reset_window_ms` of boot wipes the configuration and restarts the
//! device.  A grounded input reads as active through
//! [`IoBankPort::read_input`], so the bridge is "both lines active".  Outside the window the monitor is permanently inert, so a
//! wiring fault on those lines cannot reset a running installation.
//!
//! ## Lifecycle
//!
//! 1. `NotHeld`: both lines active on a poll → `Holding { since }`.
//! 2. `Holding`: any line inactive → back to `NotHeld`, hold time discarded.
//! 3. `Holding` for ≥ hold threshold → `Triggered` (terminal).
//!
//! The monitor only observes.  The caller performs the reset when
//! [`FactoryResetMonitor::poll`] reports [`BridgeEvent::Triggered`].

use log::{info, warn};

use crate::app::ports::IoBankPort;
use crate::config::RuntimeConfig;
use crate::pin_config::PinConfigStore;
use crate::pins::RESET_BRIDGE_LINES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    NotHeld,
    Holding { since_ms: u64 },
    Triggered,
}

/// Transitions worth telling the rest of the system about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    HoldStarted,
    HoldReleased { held_ms: u64 },
    Triggered,
}

pub struct FactoryResetMonitor {
    state: ResetState,
    boot_ms: u64,
    last_poll_ms: Option<u64>,
    window_ms: u64,
    poll_interval_ms: u64,
    hold_ms: u64,
    lines: (u8, u8),
    window_closed: bool,
}

impl FactoryResetMonitor {
    pub fn new(config: &RuntimeConfig, boot_ms: u64) -> Self {
        Self {
            state: ResetState::NotHeld,
            boot_ms,
            last_poll_ms: None,
            window_ms: u64::from(config.reset_window_ms),
            poll_interval_ms: u64::from(config.reset_poll_interval_ms),
            hold_ms: u64::from(config.reset_hold_ms),
            lines: RESET_BRIDGE_LINES,
            window_closed: false,
        }
    }

    pub fn state(&self) -> ResetState {
        self.state
    }

    /// Still inside the boot window and not yet fired.
    pub fn is_active(&self, now_ms: u64) -> bool {
        self.state != ResetState::Triggered
            && now_ms.saturating_sub(self.boot_ms) < self.window_ms
    }

    /// Sample the bridge if the poll interval has elapsed.
    pub fn poll(
        &mut self,
        now_ms: u64,
        pins: &PinConfigStore,
        io: &mut impl IoBankPort,
    ) -> Option<BridgeEvent> {
        if !self.is_active(now_ms) {
            if !self.window_closed && self.state != ResetState::Triggered {
                self.window_closed = true;
                self.state = ResetState::NotHeld;
                info!("Reset bridge: boot window closed, monitor inert");
            }
            return None;
        }

        if let Some(last) = self.last_poll_ms {
            if now_ms.saturating_sub(last) < self.poll_interval_ms {
                return None;
            }
        }
        self.last_poll_ms = Some(now_ms);

        let (a, b) = self.lines;
        let bridged = sample_line(a, pins, io) && sample_line(b, pins, io);

        match (self.state, bridged) {
            (ResetState::NotHeld, true) => {
                info!("Reset bridge: hold started");
                self.state = ResetState::Holding { since_ms: now_ms };
                Some(BridgeEvent::HoldStarted)
            }
            (ResetState::Holding { since_ms }, true) => {
                if now_ms.saturating_sub(since_ms) >= self.hold_ms {
                    warn!("Reset bridge: held {} ms, factory reset", now_ms - since_ms);
                    self.state = ResetState::Triggered;
                    Some(BridgeEvent::Triggered)
                } else {
                    None
                }
            }
            (ResetState::Holding { since_ms }, false) => {
                let held_ms = now_ms.saturating_sub(since_ms);
                info!("Reset bridge: released after {} ms", held_ms);
                self.state = ResetState::NotHeld;
                Some(BridgeEvent::HoldReleased { held_ms })
            }
            _ => None,
        }
    }
}

/// Read a bridge line from the input bank.  When the channel is currently
/// an output, its output level is restored after the read.
fn sample_line(line: u8, pins: &PinConfigStore, io: &mut impl IoBankPort) -> bool {
    let as_output = pins.slot(line).is_some_and(|s| s.is_output());
    if !as_output {
        return io.read_input(line);
    }
    let level = io.output_level(line);
    let active = io.read_input(line);
    io.write_output(line, level);
    active
}
