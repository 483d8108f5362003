//! Bus and GPIO assignments for the illumination HAT.
//!
//! Single source of truth: the config defaults reference this module
//! rather than hard-coding numbers.

// ---------------------------------------------------------------------------
// I²C bus (LM36011 LED driver)
// ---------------------------------------------------------------------------

/// Linux character device of the HAT's I²C bus.
pub const I2C_BUS_PATH: &str = "/dev/i2c-1";

// ---------------------------------------------------------------------------
// LED output routing
// ---------------------------------------------------------------------------

/// Digital output (BCM numbering): HIGH routes the driver output to LED 1.
pub const LED_SELECT_GPIO: u32 = 18;
