//! Port traits: the boundary between the controller and the outside world.
//!
//! ```text
//!   MessageSource ──▶ Controller ──▶ StatusSink
//!                         │
//!                         ▼
//!                     LightPort
//! ```
//!
//! Driven adapters (chip driver, message bus) implement these traits.
//! The [`Controller`](super::controller::Controller) consumes them via
//! generics, so the command logic never touches hardware directly.

use crate::drivers::lm36011::{ChipId, FaultFlags};
use crate::error::DriverError;

use super::status::StatusMessage;

// ───────────────────────────────────────────────────────────────
// Light port (driven adapter: controller → LED driver chip)
// ───────────────────────────────────────────────────────────────

/// Write-side port onto the LED driver.
///
/// Each method is one short, blocking bus transaction (or one GPIO write).
pub trait LightPort {
    /// Whatever the owner gets back when the port is released
    /// (bus and GPIO handles for the real driver).
    type Released;

    /// Select LED 1, reset the chip, clear faults, read the id.
    fn initialize(&mut self) -> Result<ChipId, DriverError>;

    /// Drive the select line that routes output to LED 1.
    fn select_channel_one(&mut self) -> Result<(), DriverError>;

    /// Program the flash current.  No range checking at this layer.
    fn set_flash_current(&mut self, milliamps: u32) -> Result<(), DriverError>;

    /// Read (and thereby clear) the fault flags.
    fn read_flags(&mut self) -> Result<FaultFlags, DriverError>;

    /// Give up the select line and bus.  Called exactly once, at shutdown.
    fn release(self) -> Self::Released;
}

// ───────────────────────────────────────────────────────────────
// Message bus ports
// ───────────────────────────────────────────────────────────────

/// Inbound side of the message bus.
pub trait MessageSource {
    /// Non-blocking: return the next pending payload, if any.
    fn poll(&mut self) -> Option<String>;
}

/// Outbound side of the message bus (the status topic).
pub trait StatusSink {
    fn publish(&mut self, status: &StatusMessage);
}
