//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the request/response model, the domain events and
//! the [`service::DeviceService`] that ties the pin table, trigger engine,
//! reset bridge and identity together.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod api;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
