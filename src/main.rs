//! Adam Firmware: Main Entry Point
//!
//! Hexagonal architecture around a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (IoBankPort)      (EventSink)    (Storage)    (ClockPort)     │
//! │  EspSystem         Transport                                   │
//! │  (SystemPort)      (CommandPort)                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DeviceService (pure logic)                  │    │
//! │  │  Pins · Triggers · Reset bridge · Identity             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;

use adam::adapters::device_id::{self, mac_string};
use adam::adapters::hardware::HardwareAdapter;
use adam::adapters::log_sink::LogEventSink;
use adam::adapters::nvs::NvsAdapter;
use adam::adapters::system::EspSystem;
use adam::adapters::time::Esp32TimeAdapter;
use adam::app::api::AppResponse;
use adam::app::commands::AppCommand;
use adam::app::ports::{ClockPort, CommandPort, SystemPort};
use adam::app::service::{DeviceService, TickOutcome};
use adam::config::{RuntimeConfig, validate_config};
use adam::drivers::watchdog::Watchdog;
use adam::pins::I2C_FREQ_HZ;

/// Transport placeholder until the HTTP server adapter is attached.
/// Never yields a command.
struct IdleTransport;

impl CommandPort for IdleTransport {
    fn poll_command(&mut self) -> Option<AppCommand> {
        None
    }

    fn reply(&mut self, _result: adam::error::Result<AppResponse>) {}
}

fn main() -> Result<()> {
    // ── 1. Platform init ──────────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║      Adam I/O Controller v{}      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = RuntimeConfig::default();
    validate_config(&config).map_err(|e| anyhow::anyhow!("{}", e))?;

    // Arm the watchdog before anything that could hang.
    let mut watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 2. Storage ────────────────────────────────────────────
    let nvs = NvsAdapter::new().map_err(|e| anyhow::anyhow!("NVS init failed: {}", e))?;

    // ── 3. I/O banks ──────────────────────────────────────────
    // SDA/SCL are pins::I2C_SDA_GPIO / pins::I2C_SCL_GPIO.
    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(I2C_FREQ_HZ)),
    )?;
    let mut hw = HardwareAdapter::new(i2c);
    if let Err(e) = hw.init() {
        // Non-fatal: the bus is retried on every access.
        error!("I/O expander init failed: {:?}", e);
    }

    // ── 4. Remaining adapters ─────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut system = EspSystem::new();
    let mut log_sink = LogEventSink::new();
    let mut transport = IdleTransport;

    let mac = device_id::read_mac();
    info!("MAC: {} (chip {})", mac_string(&mac), system.chip_model());

    // ── 5. Device service ─────────────────────────────────────
    let tick_ms = config.tick_interval_ms;
    let mut service = DeviceService::boot(
        nvs,
        config,
        mac,
        clock.uptime_ms(),
        &mut hw,
        &mut log_sink,
    );

    info!("System ready. Entering control loop ({} ms).", tick_ms);

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        if service.tick(now_ms, &mut hw, &mut log_sink) == TickOutcome::Restart {
            warn!("Factory reset via bridge, restarting");
            system.restart();
        }

        service.service_commands(&mut transport, &mut hw, &system, &mut log_sink);

        watchdog.feed();
        FreeRtos::delay_ms(tick_ms);
    }
}
