//! LM36011 inductorless LED flash driver.
//!
//! Register protocol over I²C at a fixed 7-bit address.  Every register
//! access is exactly one bus transaction: a `[reg, value]` write, or a
//! `[reg]` write followed by a one-byte read.  Nothing spans several
//! accesses, so a read-modify-write at this layer is **not** atomic.
//!
//! The HAT carries two LED outputs behind an analog switch.  The select
//! line (active HIGH) routes the driver output to LED 1, the only channel
//! this firmware exposes.
//!
//! ## Safety contract
//!
//! No range checking is done here.  The controller gates current changes
//! (range and lit-state) before calling [`Lm36011::set_flash_current`].

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, error, warn};

use crate::error::DriverError;

/// LM36011 7-bit I²C address (fixed in silicon).
pub const DEVICE_ADDRESS: u8 = 0x64;

/// Highest flash current the driver is rated for.
pub const MAX_FLASH_CURRENT_MA: u32 = 1500;

/// Writing this to [`Register::IdReset`] performs a software reset.
const RESET_COMMAND: u8 = 0b1000_0000;
/// Silicon id / revision bits of [`Register::IdReset`].
const CHIP_ID_MASK: u8 = 0b0011_1111;
/// Empirical mA → flash-register factor.  Not linear across the range
/// but this is the calibration the optics were characterised with.
const FLASH_CURRENT_COEFFICIENT: f64 = 0.085;

// ---------------------------------------------------------------------------
// Register map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Enable = 0x01,
    Configuration = 0x02,
    Flash = 0x03,
    Torch = 0x04,
    Flags = 0x05,
    IdReset = 0x06,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Fault flags
// ---------------------------------------------------------------------------

/// Decoded contents of the flags register.
///
/// Bits 4 and 7 are reserved and ignored.  Reading the register clears
/// latched faults in the chip, so a snapshot is only valid as of the read
/// that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultFlags {
    pub flash_timeout: bool,
    pub uvlo: bool,
    pub thermal_shutdown: bool,
    pub thermal_scale: bool,
    pub vled_short: bool,
    pub ivfm: bool,
}

impl FaultFlags {
    pub const FLASH_TIMEOUT: u8 = 1 << 0;
    pub const UVLO: u8 = 1 << 1;
    pub const THERMAL_SHUTDOWN: u8 = 1 << 2;
    pub const THERMAL_SCALE: u8 = 1 << 3;
    pub const VLED_SHORT: u8 = 1 << 5;
    pub const IVFM: u8 = 1 << 6;

    /// Mask of every defined flag bit.
    pub const DEFINED: u8 = Self::FLASH_TIMEOUT
        | Self::UVLO
        | Self::THERMAL_SHUTDOWN
        | Self::THERMAL_SCALE
        | Self::VLED_SHORT
        | Self::IVFM;

    pub const fn from_bits(byte: u8) -> Self {
        Self {
            flash_timeout: byte & Self::FLASH_TIMEOUT != 0,
            uvlo: byte & Self::UVLO != 0,
            thermal_shutdown: byte & Self::THERMAL_SHUTDOWN != 0,
            thermal_scale: byte & Self::THERMAL_SCALE != 0,
            vled_short: byte & Self::VLED_SHORT != 0,
            ivfm: byte & Self::IVFM != 0,
        }
    }

    /// Re-encode into the register layout (reserved bits zero).
    pub const fn bits(self) -> u8 {
        let mut byte = 0;
        if self.flash_timeout {
            byte |= Self::FLASH_TIMEOUT;
        }
        if self.uvlo {
            byte |= Self::UVLO;
        }
        if self.thermal_shutdown {
            byte |= Self::THERMAL_SHUTDOWN;
        }
        if self.thermal_scale {
            byte |= Self::THERMAL_SCALE;
        }
        if self.vled_short {
            byte |= Self::VLED_SHORT;
        }
        if self.ivfm {
            byte |= Self::IVFM;
        }
        byte
    }

    pub const fn any(self) -> bool {
        self.bits() != 0
    }

    /// Names of the asserted flags, in register bit order.
    pub fn asserted(self) -> impl Iterator<Item = &'static str> {
        [
            (self.flash_timeout, "flash_timeout"),
            (self.uvlo, "UVLO"),
            (self.thermal_shutdown, "thermal_shutdown"),
            (self.thermal_scale, "thermal_scale"),
            (self.vled_short, "VLED_short"),
            (self.ivfm, "IVFM"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
    }
}

// ---------------------------------------------------------------------------
// Chip identity
// ---------------------------------------------------------------------------

/// Silicon id: low six bits of [`Register::IdReset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipId(pub u8);

impl core::fmt::Display for ChipId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Flash-register code for a requested current: `floor(mA * 0.085)`,
/// saturating at the register width.
pub fn flash_register_value(milliamps: u32) -> u8 {
    (f64::from(milliamps) * FLASH_CURRENT_COEFFICIENT).floor() as u8
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct Lm36011<I2C, P> {
    i2c: I2C,
    select: P,
    address: u8,
    flags: FaultFlags,
    chip_id: Option<ChipId>,
}

impl<I2C: I2c, P: OutputPin> Lm36011<I2C, P> {
    pub fn new(i2c: I2C, select: P) -> Self {
        Self::new_with_addr(i2c, select, DEVICE_ADDRESS)
    }

    pub fn new_with_addr(i2c: I2C, select: P, address: u8) -> Self {
        Self {
            i2c,
            select,
            address,
            flags: FaultFlags::default(),
            chip_id: None,
        }
    }

    /// Route output to LED 1, reset the chip, clear latched faults and
    /// read back the silicon id.
    ///
    /// Any failure is logged and returned; there is no retry.
    pub fn initialize(&mut self) -> Result<ChipId, DriverError> {
        let result = self.bring_up();
        if let Err(e) = &result {
            error!("Error with the LED control module: {}", e);
        }
        result
    }

    fn bring_up(&mut self) -> Result<ChipId, DriverError> {
        self.select_channel_one()?;
        self.force_reset()?;
        if self.read_flags()?.any() {
            error!("Flags raised in the LED module, clearing now");
            self.flags = FaultFlags::default();
        }
        let id = self.read_chip_id()?;
        debug!("LED module id is {}", id);
        self.chip_id = Some(id);
        Ok(id)
    }

    pub fn force_reset(&mut self) -> Result<(), DriverError> {
        debug!("Resetting the LED chip");
        self.write_reg(Register::IdReset, RESET_COMMAND)
    }

    pub fn read_chip_id(&mut self) -> Result<ChipId, DriverError> {
        let raw = self.read_reg(Register::IdReset)?;
        Ok(ChipId(raw & CHIP_ID_MASK))
    }

    /// Read (and thereby clear) the fault flags, logging each asserted one.
    pub fn read_flags(&mut self) -> Result<FaultFlags, DriverError> {
        let flags = FaultFlags::from_bits(self.read_reg(Register::Flags)?);
        for name in flags.asserted() {
            warn!("Flag {} asserted", name);
        }
        self.flags = flags;
        Ok(flags)
    }

    pub fn set_flash_current(&mut self, milliamps: u32) -> Result<(), DriverError> {
        let value = flash_register_value(milliamps);
        debug!("Setting flash current to {} ({}mA)", value, milliamps);
        self.write_reg(Register::Flash, value)
    }

    pub fn select_channel_one(&mut self) -> Result<(), DriverError> {
        debug!("Switching output to LED 1");
        self.select.set_high().map_err(|_| DriverError::SelectLine)
    }

    /// Last fault snapshot (as of the most recent flags read).
    pub fn fault_flags(&self) -> FaultFlags {
        self.flags
    }

    pub fn chip_id(&self) -> Option<ChipId> {
        self.chip_id
    }

    /// Deassert the select line and hand the bus and pin back.
    pub fn release(mut self) -> (I2C, P) {
        if self.select.set_low().is_err() {
            warn!("LED select line could not be released");
        }
        (self.i2c, self.select)
    }

    fn read_reg(&mut self, reg: Register) -> Result<u8, DriverError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg.addr()], &mut buf)
            .map_err(|e| DriverError::BusFault(e.kind()))?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), DriverError> {
        self.i2c
            .write(self.address, &[reg.addr(), value])
            .map_err(|e| DriverError::BusFault(e.kind()))
    }
}
