//! Outbound status replies.
//!
//! The [`Controller`](super::controller::Controller) emits these through
//! the [`StatusSink`](super::ports::StatusSink) port.  On the wire every
//! reply is `{"status": "<text>"}`; delivery is fire-and-forget.

use serde::Serialize;

use crate::error::CommandError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub status: String,
}

impl StatusMessage {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    /// Published once the loop is about to start polling.
    pub fn ready() -> Self {
        Self::new("Ready")
    }

    /// Published as the last message before the controller exits.
    pub fn dead() -> Self {
        Self::new("Dead")
    }

    pub fn led_on(led_index: u8) -> Self {
        Self::new(format!("Led {led_index}: On"))
    }

    pub fn led_off(led_index: u8) -> Self {
        Self::new(format!("Led {led_index}: Off"))
    }

    pub fn current_set(milliamps: u32) -> Self {
        Self::new(format!("Current set to {milliamps}mA"))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&CommandError> for StatusMessage {
    fn from(err: &CommandError) -> Self {
        Self::new(err.to_string())
    }
}
