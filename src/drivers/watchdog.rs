//! Task watchdog for the control loop.
//!
//! On target the loop task subscribes to the ESP-IDF TWDT, which panics
//! (and so reboots) when the loop stops feeding it.  Off target the
//! watchdog only counts feeds.

use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    /// The loop task is registered with the TWDT.
    armed: bool,
    feeds: u64,
}

impl Watchdog {
    /// Reconfigure the TWDT to `timeout_ms` and register the calling task.
    /// A failed registration leaves the loop running unguarded.
    pub fn new(timeout_ms: u32) -> Self {
        let armed = match subscribe(timeout_ms) {
            Ok(()) => {
                info!("Watchdog: armed, {} ms", timeout_ms);
                true
            }
            Err(code) => {
                warn!("Watchdog: not armed (esp_err {})", code);
                false
            }
        };
        Self {
            timeout_ms,
            armed,
            feeds: 0,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feeds since construction.
    pub fn feeds(&self) -> u64 {
        self.feeds
    }

    /// Reset the countdown.  Call once per tick.
    pub fn feed(&mut self) {
        self.feeds += 1;
        #[cfg(target_os = "espidf")]
        if self.armed {
            // SAFETY: the calling task was registered in `subscribe`.
            unsafe {
                esp_idf_svc::sys::esp_task_wdt_reset();
            }
        }
    }
}

#[cfg(target_os = "espidf")]
fn subscribe(timeout_ms: u32) -> Result<(), i32> {
    use esp_idf_svc::sys::{ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure};

    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: plain FFI calls; a null handle means the current task.
    unsafe {
        // Fails harmlessly when the TWDT was configured by the bootloader.
        let _ = esp_task_wdt_reconfigure(&cfg);
        let ret = esp_task_wdt_add(core::ptr::null_mut());
        if ret == ESP_OK { Ok(()) } else { Err(ret) }
    }
}

#[cfg(not(target_os = "espidf"))]
#[allow(clippy::unnecessary_wraps)]
fn subscribe(_timeout_ms: u32) -> Result<(), i32> {
    Ok(())
}
