//! Application core: command handling and safety gating, zero I/O.
//!
//! All interaction with the chip and the message bus happens through
//! **port traits** defined in [`ports`], keeping the controller fully
//! testable without real peripherals.

pub mod commands;
pub mod controller;
pub mod ports;
pub mod status;
