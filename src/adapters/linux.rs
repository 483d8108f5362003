//! Linux bring-up: `/dev/i2c-N` plus a sysfs GPIO for the select line.
//!
//! Only built with the `linux` feature.  The bus and pin are opened once
//! here, owned by the driver for the controller's lifetime, and handed
//! back at shutdown so the pin can be unexported.

use anyhow::{Context, Result};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{I2cdev, SysfsPin};
use log::info;

use crate::config::LightConfig;
use crate::drivers::lm36011::Lm36011;

pub type LinuxLightModule = Lm36011<I2cdev, SysfsPin>;

/// Open the I²C bus and export the select GPIO as a low output.
pub fn open_light_module(config: &LightConfig) -> Result<LinuxLightModule> {
    let i2c = I2cdev::new(&config.i2c_bus)
        .with_context(|| format!("opening I2C bus {}", config.i2c_bus))?;

    let select = SysfsPin::new(u64::from(config.select_gpio));
    select
        .export()
        .with_context(|| format!("exporting GPIO {}", config.select_gpio))?;
    select
        .set_direction(Direction::Low)
        .with_context(|| format!("configuring GPIO {} as output", config.select_gpio))?;

    info!(
        "LED driver on {} @ 0x{:02x}, select GPIO {}",
        config.i2c_bus, config.device_address, config.select_gpio
    );
    Ok(Lm36011::new_with_addr(i2c, select, config.device_address))
}

/// Return the select GPIO to the kernel.
pub fn release_select_pin(select: &SysfsPin) -> Result<()> {
    select.unexport().context("unexporting LED select GPIO")
}
