//! Light module configuration parameters
//!
//! All tunable parameters for the illumination controller.  Every field
//! has a default; a JSON document may override any subset of them.
//! Nothing is persisted back.

use serde::{Deserialize, Serialize};

use crate::drivers::lm36011::{DEVICE_ADDRESS, MAX_FLASH_CURRENT_MA};
use crate::error::ConfigError;
use crate::pins;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    // --- Hardware ---
    /// I²C character device the LED driver sits on
    pub i2c_bus: String,
    /// 7-bit I²C address of the LED driver
    pub device_address: u8,
    /// GPIO (BCM) routing driver output to LED 1
    pub select_gpio: u32,

    // --- Timing ---
    /// Sleep between message polls (milliseconds)
    pub poll_interval_ms: u64,
    /// Settle time after chip bring-up before reporting ready (milliseconds)
    pub init_settle_ms: u64,

    // --- Current ---
    /// Flash current programmed at shutdown (mA)
    pub shutdown_current_ma: u32,
    /// Lowest current an operator may request (mA)
    pub min_current_ma: u32,
    /// Highest current an operator may request (mA)
    pub max_current_ma: u32,

    // --- Messaging ---
    /// Topic status replies are published under
    pub status_topic: String,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            // Hardware
            i2c_bus: pins::I2C_BUS_PATH.to_owned(),
            device_address: DEVICE_ADDRESS,
            select_gpio: pins::LED_SELECT_GPIO,

            // Timing
            poll_interval_ms: 100, // 10 Hz
            init_settle_ms: 500,

            // Current
            shutdown_current_ma: 1,
            min_current_ma: 11,
            max_current_ma: MAX_FLASH_CURRENT_MA,

            // Messaging
            status_topic: "status/light".to_owned(),
        }
    }
}

impl LightConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the hardware or loop cannot honour.  Never clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_address > 0x7F {
            return Err(ConfigError::ValidationFailed(
                "device_address must be a 7-bit address",
            ));
        }
        if self.min_current_ma == 0 || self.min_current_ma > self.max_current_ma {
            return Err(ConfigError::ValidationFailed(
                "min_current_ma must be non-zero and not above max_current_ma",
            ));
        }
        if self.max_current_ma > MAX_FLASH_CURRENT_MA {
            return Err(ConfigError::ValidationFailed(
                "max_current_ma exceeds the driver rating",
            ));
        }
        if self.shutdown_current_ma > self.min_current_ma {
            return Err(ConfigError::ValidationFailed(
                "shutdown_current_ma must not exceed min_current_ma",
            ));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > 1000 {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be within 1..=1000",
            ));
        }
        if self.status_topic.is_empty() {
            return Err(ConfigError::ValidationFailed("status_topic must not be empty"));
        }
        Ok(())
    }

    /// Operator-requestable current range (inclusive).
    pub fn current_range(&self) -> core::ops::RangeInclusive<u32> {
        self.min_current_ma..=self.max_current_ma
    }
}
