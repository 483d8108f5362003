//! Light controller: the command-processing core.
//!
//! [`Controller`] owns the LED driver (through [`LightPort`]) and the
//! tracked on/off state.  It polls at most one message per loop
//! iteration, processes it to completion, then sleeps.
//!
//! ```text
//!             ┌──────────┐  message   ┌──────────┐
//!   start ──▶ │   Idle   │ ─────────▶ │ Dispatch │
//!             └──────────┘            └──────────┘
//!                  ▲                       │
//!                  │      ┌────────────────┼──────────────┬─────────┐
//!                  │      ▼                ▼              ▼         ▼
//!                  │  ApplyOn          ApplyOff     ApplySettings  Reject
//!                  └──────┴────────────────┴──────────────┴─────────┘
//!
//!   stop flag ──▶ ShuttingDown (terminal)
//! ```
//!
//! ## Safety contract
//!
//! The flash current may only change while the LED is off.  Every
//! refused or failed request gets exactly one status reply; nothing a
//! single message does can end the loop.

use core::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::config::LightConfig;
use crate::drivers::lm36011::ChipId;
use crate::error::{CommandError, StartupError, StartupFailed};

use super::commands::{ControlMessage, parse_message};
use super::ports::{LightPort, MessageSource, StatusSink};
use super::status::StatusMessage;

/// The only LED wired to the driver output.
const SUPPORTED_LED: u8 = 1;

/// Controller-owned view of the light.  The chip has no "lit" readback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LightState {
    is_on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dispatch,
    ApplyOn,
    ApplyOff,
    ApplySettings,
    Reject,
    ShuttingDown,
}

pub struct Controller<L: LightPort> {
    light: L,
    state: LightState,
    phase: Phase,
    chip_id: ChipId,
    config: LightConfig,
}

impl<L: LightPort> Controller<L> {
    /// Validate `config`, bring up the chip and take ownership of it.
    ///
    /// A failure here leaves the light uncontrollable and is meant to be
    /// fatal to the caller.  The port is released before returning, so the
    /// caller gets the hardware handles back either way.
    pub fn new(mut light: L, config: LightConfig) -> Result<Self, StartupFailed<L::Released>> {
        info!("Light controller initialising");
        let chip_id = match Self::bring_up(&mut light, &config) {
            Ok(id) => id,
            Err(cause) => {
                error!("Could not start the LED module, stopping now: {}", cause);
                return Err(StartupFailed {
                    cause,
                    released: light.release(),
                });
            }
        };
        info!("LED module {} initialised", chip_id);

        Ok(Self {
            light,
            state: LightState::default(),
            phase: Phase::Idle,
            chip_id,
            config,
        })
    }

    fn bring_up(light: &mut L, config: &LightConfig) -> Result<ChipId, StartupError> {
        config.validate()?;
        Ok(light.initialize()?)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce readiness on the status topic.
    pub fn start(&mut self, sink: &mut impl StatusSink) {
        sink.publish(&StatusMessage::ready());
        info!("Light module is ready");
    }

    /// Poll, process and sleep until `stop` is raised.
    ///
    /// The flag is checked once per iteration, so a message being
    /// processed always completes first.
    pub fn run(
        &mut self,
        source: &mut impl MessageSource,
        sink: &mut impl StatusSink,
        stop: &AtomicBool,
    ) {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        info!("Light control loop started ({}ms poll)", self.config.poll_interval_ms);

        while !stop.load(Ordering::Acquire) {
            self.poll_once(source, sink);
            std::thread::sleep(interval);
        }
        info!("Stop requested, leaving the control loop");
    }

    /// Process at most one pending message.  Returns whether one was handled.
    pub fn poll_once(
        &mut self,
        source: &mut impl MessageSource,
        sink: &mut impl StatusSink,
    ) -> bool {
        match source.poll() {
            Some(raw) => {
                self.process(&raw, sink);
                true
            }
            None => false,
        }
    }

    /// Park the light, clear faults, release the hardware and say goodbye.
    ///
    /// Bus failures are logged and do not skip the remaining steps.
    pub fn shutdown(mut self, sink: &mut impl StatusSink) -> L::Released {
        self.enter(Phase::ShuttingDown);
        info!("Shutting down the light controller");

        if let Err(e) = self.light.set_flash_current(self.config.shutdown_current_ma) {
            error!("Could not park the flash current: {}", e);
        }
        if let Err(e) = self.light.read_flags() {
            error!("Could not clear the fault flags: {}", e);
        }
        let released = self.light.release();
        sink.publish(&StatusMessage::dead());
        info!("Light controller shut down");
        released
    }

    // ── Command handling ──────────────────────────────────────

    /// Interpret one raw payload and reply to every request in it.
    pub fn process(&mut self, raw: &str, sink: &mut impl StatusSink) {
        self.enter(Phase::Dispatch);
        info!("We received a new message");
        debug!("{}", raw);

        for message in parse_message(raw) {
            let reply = match self.dispatch(message) {
                Ok(status) => status,
                Err(err) => self.reject(&err),
            };
            sink.publish(&reply);
        }
        self.enter(Phase::Idle);
    }

    fn dispatch(&mut self, message: ControlMessage) -> Result<StatusMessage, CommandError> {
        match message {
            ControlMessage::TurnOn { led_index } => self.apply_on(led_index),
            ControlMessage::TurnOff { led_index } => self.apply_off(led_index),
            ControlMessage::SetCurrent { milliamps } => self.apply_current(milliamps),
            // The lit-state gate applies before the value is looked at.
            ControlMessage::Malformed(CommandError::InvalidCurrent(_)) if self.state.is_on => {
                Err(CommandError::UnsafeStateTransition)
            }
            ControlMessage::Malformed(err) => Err(err),
        }
    }

    fn apply_on(&mut self, led_index: u8) -> Result<StatusMessage, CommandError> {
        if led_index != SUPPORTED_LED {
            return Err(CommandError::UnsupportedLed(u64::from(led_index)));
        }
        self.enter(Phase::ApplyOn);
        info!("Turning the light on");
        self.light
            .select_channel_one()
            .map_err(CommandError::ChannelSelect)?;
        self.state.is_on = true;
        Ok(StatusMessage::led_on(led_index))
    }

    // Only the tracked state changes: dropping the select line would route
    // the driver to the second LED output rather than darken this one.
    fn apply_off(&mut self, led_index: u8) -> Result<StatusMessage, CommandError> {
        if led_index != SUPPORTED_LED {
            return Err(CommandError::UnsupportedLed(u64::from(led_index)));
        }
        self.enter(Phase::ApplyOff);
        info!("Turning the light off");
        self.state.is_on = false;
        Ok(StatusMessage::led_off(led_index))
    }

    fn apply_current(&mut self, milliamps: u32) -> Result<StatusMessage, CommandError> {
        self.enter(Phase::ApplySettings);
        if self.state.is_on {
            return Err(CommandError::UnsafeStateTransition);
        }
        let range = self.config.current_range();
        if !range.contains(&milliamps) {
            return Err(CommandError::CurrentOutOfRange {
                min: *range.start(),
                max: *range.end(),
            });
        }
        info!("Switching the LED current to {}mA", milliamps);
        self.light
            .set_flash_current(milliamps)
            .map_err(CommandError::SetCurrent)?;
        Ok(StatusMessage::current_set(milliamps))
    }

    fn reject(&mut self, err: &CommandError) -> StatusMessage {
        self.enter(Phase::Reject);
        match err {
            CommandError::Malformed(payload) => {
                error!("The received message has the wrong argument {}", payload);
            }
            CommandError::ChannelSelect(e) | CommandError::SetCurrent(e) => {
                error!("{} ({})", err, e);
            }
            _ => warn!("{}", err),
        }
        StatusMessage::from(err)
    }

    fn enter(&mut self, next: Phase) {
        if next != self.phase {
            debug!("Controller: {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether the LED is tracked as lit.
    pub fn device_state(&self) -> bool {
        self.state.is_on
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn chip_id(&self) -> ChipId {
        self.chip_id
    }

    pub fn config(&self) -> &LightConfig {
        &self.config
    }
}
