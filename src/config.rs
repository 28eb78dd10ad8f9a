//! Runtime timing parameters
//!
//! Tunables for the scheduler loop, the factory-reset bridge detector and
//! the push-button gesture classifier.  Board wiring lives in `pins.rs`.

use serde::{Deserialize, Serialize};

/// Core timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Scheduler ---
    /// Main loop tick interval (milliseconds)
    pub tick_interval_ms: u32,
    /// Task watchdog timeout; the loop feeds it every tick (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Factory-reset bridge ---
    /// Window after boot during which the bridge is honoured (milliseconds)
    pub reset_window_ms: u32,
    /// Minimum spacing between bridge polls (milliseconds)
    pub reset_poll_interval_ms: u32,
    /// Continuous hold required to trigger the reset (milliseconds)
    pub reset_hold_ms: u32,

    // --- Push buttons ---
    /// Debounce applied to press and release edges (milliseconds)
    pub debounce_ms: u32,
    /// Hold time classified as a long press (milliseconds)
    pub long_press_ms: u32,
    /// Maximum gap between two presses of a double press (milliseconds)
    pub double_press_window_ms: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            // Scheduler
            tick_interval_ms: 20, // 50 Hz input sampling
            watchdog_timeout_ms: 10_000,

            // Factory-reset bridge
            reset_window_ms: 30_000,
            reset_poll_interval_ms: 100,
            reset_hold_ms: 5_000,

            // Push buttons
            debounce_ms: 50,
            long_press_ms: 800,
            double_press_window_ms: 300,
        }
    }
}

/// Errors from [`validate_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidConfig(pub &'static str);

impl core::fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid config: {}", self.0)
    }
}

/// Range-check every field and the relations between them.
pub fn validate_config(cfg: &RuntimeConfig) -> Result<(), InvalidConfig> {
    if !(1..=1000).contains(&cfg.tick_interval_ms) {
        return Err(InvalidConfig("tick_interval_ms must be 1–1000"));
    }
    if cfg.watchdog_timeout_ms < 10 * cfg.tick_interval_ms {
        return Err(InvalidConfig(
            "watchdog_timeout_ms must cover at least 10 ticks",
        ));
    }
    if cfg.reset_poll_interval_ms < cfg.tick_interval_ms {
        return Err(InvalidConfig(
            "reset_poll_interval_ms must not be shorter than tick_interval_ms",
        ));
    }
    if cfg.reset_hold_ms == 0 || cfg.reset_hold_ms >= cfg.reset_window_ms {
        return Err(InvalidConfig(
            "reset_hold_ms must be non-zero and shorter than reset_window_ms",
        ));
    }
    if cfg.debounce_ms >= cfg.long_press_ms {
        return Err(InvalidConfig("debounce_ms must be < long_press_ms"));
    }
    if cfg.double_press_window_ms == 0 {
        return Err(InvalidConfig("double_press_window_ms must be non-zero"));
    }
    Ok(())
}
