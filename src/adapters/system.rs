//! System adapter: chip facts, network address, restart.
//!
//! Implements [`SystemPort`] with raw ESP-IDF calls on target.  Off target
//! it reports a fixed chip, an optional fake address, and records restart
//! requests instead of rebooting.

use crate::app::ports::SystemPort;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct EspSystem {
    #[cfg(not(target_os = "espidf"))]
    ip: Option<[u8; 4]>,
    #[cfg(not(target_os = "espidf"))]
    restarts: u32,
}

impl Default for EspSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl EspSystem {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            ip: None,
            #[cfg(not(target_os = "espidf"))]
            restarts: 0,
        }
    }

    /// Simulation: pretend the station interface has an address.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_ip_address(&mut self, ip: Option<[u8; 4]>) {
        self.ip = ip;
    }

    /// Simulation: how many times `restart()` was called.
    #[cfg(not(target_os = "espidf"))]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl SystemPort for EspSystem {
    #[cfg(target_os = "espidf")]
    fn chip_model(&self) -> &'static str {
        let mut info = esp_chip_info_t::default();
        // SAFETY: esp_chip_info only fills the caller-owned struct.
        unsafe { esp_chip_info(&mut info) };
        #[allow(non_upper_case_globals)]
        match info.model {
            esp_chip_model_t_CHIP_ESP32 => "ESP32",
            esp_chip_model_t_CHIP_ESP32S2 => "ESP32-S2",
            esp_chip_model_t_CHIP_ESP32S3 => "ESP32-S3",
            esp_chip_model_t_CHIP_ESP32C3 => "ESP32-C3",
            _ => "ESP32-unknown",
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn chip_model(&self) -> &'static str {
        "host-sim"
    }

    #[cfg(target_os = "espidf")]
    fn ip_address(&self) -> Option<[u8; 4]> {
        // SAFETY: the netif lookup returns null when the station interface
        // was never created; ip_info is caller-owned.
        unsafe {
            let netif = esp_netif_get_handle_from_ifkey(b"WIFI_STA_DEF\0".as_ptr() as *const _);
            if netif.is_null() {
                return None;
            }
            let mut ip_info = esp_netif_ip_info_t::default();
            if esp_netif_get_ip_info(netif, &mut ip_info) != ESP_OK {
                return None;
            }
            let addr = ip_info.ip.addr;
            (addr != 0).then(|| addr.to_le_bytes())
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn ip_address(&self) -> Option<[u8; 4]> {
        self.ip
    }

    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        log::warn!("System: restarting");
        // SAFETY: esp_restart never returns.
        unsafe { esp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        log::warn!("System(sim): restart requested");
        self.restarts += 1;
    }
}
