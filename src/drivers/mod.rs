//! Peripheral drivers and input classifiers.

pub mod button;
pub mod pcf8575;
pub mod watchdog;
