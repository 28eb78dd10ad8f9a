//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements   | Connects to                     |
//! |--------------|--------------|---------------------------------|
//! | `device_id`  | (helpers)    | eFuse base MAC                  |
//! | `hardware`   | IoBankPort   | Two PCF8575 expanders over I²C  |
//! | `log_sink`   | EventSink    | Serial log output               |
//! | `nvs`        | StoragePort  | NVS / in-memory store           |
//! | `system`     | SystemPort   | Chip info, netif, restart       |
//! | `time`       | ClockPort    | ESP32 system timer              |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod system;
pub mod time;
