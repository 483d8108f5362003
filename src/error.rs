//! Error types for the illumination module.
//!
//! Three families, one per layer:
//!
//! - [`DriverError`]: a register transaction or the select line failed.
//!   Fatal during initialisation, absorbed into a status reply afterwards.
//! - [`CommandError`]: an inbound request was rejected.  The `Display`
//!   output is the exact status text sent back to the operator.
//! - [`ConfigError`]: configuration could not be parsed or failed range
//!   validation.
//! - [`StartupFailed`]: the controller could not be built.  Carries the
//!   released hardware so the caller can still return it to the OS.
//!
//! All variants are hand-written `Display` enums so the control loop can
//! format them without allocation on the hot path.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Driver errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// An I²C register read or write failed (NACK, arbitration loss, bus error).
    BusFault(ErrorKind),
    /// The GPIO line routing output to LED 1 could not be driven.
    SelectLine,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFault(kind) => write!(f, "I2C bus fault: {kind}"),
            Self::SelectLine => write!(f, "LED select line could not be driven"),
        }
    }
}

impl std::error::Error for DriverError {}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Reasons an inbound control message is refused.
///
/// Payload strings carry the offending message so the reply can echo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Neither `action` nor `settings` present, or not a JSON object at all.
    Malformed(String),
    /// `action` holds something other than `"on"` / `"off"`.
    UnknownAction(String),
    /// `settings` present without a recognised key.
    UnknownSettings(String),
    /// `settings.current` is not a non-negative integer.
    InvalidCurrent(String),
    /// Only LED 1 is wired to the driver output.
    UnsupportedLed(u64),
    /// Requested current outside the operator range.
    CurrentOutOfRange { min: u32, max: u32 },
    /// Current change requested while the LED is lit.
    UnsafeStateTransition,
    /// The select line failed while switching the LED on.
    ChannelSelect(DriverError),
    /// The flash-current register write failed.
    SetCurrent(DriverError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(_) => {
                write!(f, "Received message did not contain action or settings")
            }
            Self::UnknownAction(msg) => write!(f, "Action not understood in {msg}"),
            Self::UnknownSettings(msg) => write!(f, "Settings request not understood in {msg}"),
            Self::InvalidCurrent(msg) => write!(f, "Current value not understood in {msg}"),
            Self::UnsupportedLed(led) => write!(f, "Led {led} is not available"),
            Self::CurrentOutOfRange { min, max } => {
                write!(f, "Current must be between {min} and {max}mA")
            }
            Self::UnsafeStateTransition => {
                write!(f, "Turn off the LED before changing the current")
            }
            Self::ChannelSelect(_) => {
                write!(f, "Error while turning Led 1 on, power cycle your machine")
            }
            Self::SetCurrent(_) => {
                write!(f, "Error while setting the current, power cycle your machine")
            }
        }
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for
    /// [`LightConfig`](crate::config::LightConfig).
    Parse(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Start-up errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// The supplied configuration failed validation.
    Config(ConfigError),
    /// Chip bring-up failed.
    Driver(DriverError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Driver(e) => write!(f, "LED module bring-up failed: {e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Driver(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DriverError> for StartupError {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

/// A failed [`Controller::new`](crate::app::controller::Controller::new).
///
/// The port has already been released; `released` holds what it gave back.
pub struct StartupFailed<R> {
    pub cause: StartupError,
    pub released: R,
}

impl<R> fmt::Debug for StartupFailed<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartupFailed")
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

impl<R> fmt::Display for StartupFailed<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}
