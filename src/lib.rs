//! Adam I/O controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod identity;
pub mod pin_config;
pub mod pins;
pub mod reset_bridge;
pub mod schema;
pub mod triggers;
pub mod xr8;

// Platform adapters and drivers compile on host too; the real
// implementations are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
