//! Hardware adapter: exposes the LM36011 driver through [`LightPort`].
//!
//! This is the only path by which the controller touches the chip.  The
//! driver is generic over `embedded-hal` traits, so the same adapter
//! serves the Linux bus (`/dev/i2c-N` + sysfs GPIO) and test doubles.

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::app::ports::LightPort;
use crate::drivers::lm36011::{ChipId, FaultFlags, Lm36011};
use crate::error::DriverError;

impl<I2C: I2c, P: OutputPin> LightPort for Lm36011<I2C, P> {
    type Released = (I2C, P);

    fn initialize(&mut self) -> Result<ChipId, DriverError> {
        Lm36011::initialize(self)
    }

    fn select_channel_one(&mut self) -> Result<(), DriverError> {
        Lm36011::select_channel_one(self)
    }

    fn set_flash_current(&mut self, milliamps: u32) -> Result<(), DriverError> {
        Lm36011::set_flash_current(self, milliamps)
    }

    fn read_flags(&mut self) -> Result<FaultFlags, DriverError> {
        Lm36011::read_flags(self)
    }

    fn release(self) -> (I2C, P) {
        Lm36011::release(self)
    }
}
