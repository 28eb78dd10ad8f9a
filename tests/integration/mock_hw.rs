//! Mock adapters for integration tests.
//!
//! Records every output write and storage save so tests can assert on
//! the full history without touching real expanders or flash.

use adam::app::api::AppResponse;
use adam::app::commands::AppCommand;
use adam::app::events::AppEvent;
use adam::app::ports::{CommandPort, EventSink, IoBankPort, StorageError, StoragePort, SystemPort};
use adam::app::service::DeviceService;
use adam::config::RuntimeConfig;
use adam::pins::PIN_COUNT;
use std::collections::{HashMap, VecDeque};

pub const MAC: [u8; 6] = [0x24, 0x6F, 0x28, 0xA1, 0xB2, 0xC3];

/// First instant after the reset-bridge window, for tests that want the
/// bridge out of the way.
pub const AFTER_WINDOW_MS: u64 = 31_000;

// ── MockBank ──────────────────────────────────────────────────

/// Both expander banks.  Inputs hold logical levels and start inactive,
/// as on an idle board.
pub struct MockBank {
    pub inputs: [bool; PIN_COUNT],
    pub outputs: [bool; PIN_COUNT],
    pub writes: Vec<(u8, bool)>,
}

#[allow(dead_code)]
impl MockBank {
    pub fn new() -> Self {
        Self {
            inputs: [false; PIN_COUNT],
            outputs: [false; PIN_COUNT],
            writes: Vec::new(),
        }
    }

    pub fn set_input(&mut self, line: u8, active: bool) {
        self.inputs[line as usize] = active;
    }

    /// Jumper (or release) both factory-reset bridge lines.
    pub fn set_bridge(&mut self, shorted: bool) {
        let (a, b) = adam::pins::RESET_BRIDGE_LINES;
        self.set_input(a, shorted);
        self.set_input(b, shorted);
    }
}

impl Default for MockBank {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBankPort for MockBank {
    fn read_input(&mut self, line: u8) -> bool {
        self.inputs[line as usize]
    }

    fn write_output(&mut self, line: u8, high: bool) {
        self.outputs[line as usize] = high;
        self.writes.push((line, high));
    }

    fn output_level(&self, line: u8) -> bool {
        self.outputs[line as usize]
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockNvs {
    pub blobs: HashMap<String, Vec<u8>>,
    pub saves: usize,
    /// Every save fails with `Full`.
    pub fail_saves: bool,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }
}

impl StoragePort for MockNvs {
    fn load(&self, key: &str, buf: &mut [u8]) -> Result<(), StorageError> {
        match self.blobs.get(key) {
            Some(v) if v.len() == buf.len() => {
                buf.copy_from_slice(v);
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    fn save(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Full);
        }
        self.saves += 1;
        self.blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

// ── MockSystem ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSystem {
    pub ip: Option<[u8; 4]>,
    pub restarts: u32,
}

impl SystemPort for MockSystem {
    fn chip_model(&self) -> &'static str {
        "ESP32-D0WD-V3"
    }

    fn ip_address(&self) -> Option<[u8; 4]> {
        self.ip
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── QueueTransport ────────────────────────────────────────────

/// Command port fed from a queue; replies are kept in order.
#[derive(Default)]
pub struct QueueTransport {
    pub pending: VecDeque<AppCommand>,
    pub replies: Vec<adam::error::Result<AppResponse>>,
}

#[allow(dead_code)]
impl QueueTransport {
    pub fn with(commands: impl IntoIterator<Item = AppCommand>) -> Self {
        Self {
            pending: commands.into_iter().collect(),
            replies: Vec::new(),
        }
    }
}

impl CommandPort for QueueTransport {
    fn poll_command(&mut self) -> Option<AppCommand> {
        self.pending.pop_front()
    }

    fn reply(&mut self, result: adam::error::Result<AppResponse>) {
        self.replies.push(result);
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A booted service with its adapters.
pub struct Rig {
    pub service: DeviceService<MockNvs>,
    pub io: MockBank,
    pub sys: MockSystem,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn boot() -> Self {
        Self::boot_with(MockNvs::new())
    }

    pub fn boot_with(store: MockNvs) -> Self {
        let mut io = MockBank::new();
        let mut sink = RecordingSink::new();
        let service = DeviceService::boot(
            store,
            RuntimeConfig::default(),
            MAC,
            0,
            &mut io,
            &mut sink,
        );
        Self {
            service,
            io,
            sys: MockSystem::default(),
            sink,
        }
    }

    /// Reboot on the current storage contents.  Output levels are lost,
    /// as on real hardware.
    pub fn reboot(self) -> Self {
        Self::boot_with(self.service.store().clone())
    }

    pub fn tick(&mut self, now_ms: u64) -> adam::app::service::TickOutcome {
        self.service.tick(now_ms, &mut self.io, &mut self.sink)
    }

    /// Tick every 20 ms over `[from, to)`.
    pub fn run(&mut self, from: u64, to: u64) {
        for t in (from..to).step_by(20) {
            self.tick(t);
        }
    }

    pub fn cmd(&mut self, cmd: AppCommand) -> adam::error::Result<AppResponse> {
        self.service
            .handle_command(cmd, &mut self.io, &self.sys, &mut self.sink)
    }
}
