//! System configuration parameters
//!
//! All tunable parameters for the boardctl daemon. Values can be overridden
//! via a JSON config file; the feed address additionally via `--addr`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Status feed ---
    /// Feed address, `host:port`
    pub feed_addr: String,

    // --- Actuator device ---
    /// PWM device path (pi-blaster FIFO)
    pub device_path: String,
    /// Channel-to-pin mapping
    pub pins: PinConfig,

    // --- Indicator timing ---
    /// Blink tick period (milliseconds); visible blink period is twice this
    pub tick_interval_ms: u64,

    // --- Reconnect policy ---
    /// Fixed backoff between reconnect attempts (milliseconds)
    pub reconnect_backoff_ms: u64,

    // --- Thermal control ---
    /// EWMA smoothing window (samples); 1 disables smoothing
    pub ewma_window: u32,
    /// Off -> Half rise threshold (Celsius)
    pub fan_rise_half_c: f64,
    /// Half -> Full rise threshold (Celsius)
    pub fan_rise_full_c: f64,
    /// Full -> Half fall threshold (Celsius)
    pub fan_fall_half_c: f64,
    /// Any level -> Off fall threshold (Celsius)
    pub fan_fall_off_c: f64,
}

/// BCM pin numbers for each actuator channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub power: u8,
    pub gps: u8,
    pub traffic: u8,
    pub fan_a: u8,
    pub fan_b: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            power: 26,
            gps: 6,
            traffic: 5,
            fan_a: 13,
            fan_b: 18,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            feed_addr: "localhost:2000".into(),

            device_path: "/dev/pi-blaster".into(),
            pins: PinConfig::default(),

            tick_interval_ms: 500, // 1 s visible blink period

            reconnect_backoff_ms: 1000,

            ewma_window: 5,
            fan_rise_half_c: 40.0,
            fan_rise_full_c: 50.0,
            fan_fall_half_c: 45.0,
            fan_fall_off_c: 35.0,
        }
    }
}

impl SystemConfig {
    /// Load from a JSON file.
    pub fn load(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|_| Error::Config("file unreadable"))?;
        let config: Self =
            serde_json::from_str(&text).map_err(|_| Error::Config("file malformed"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent values instead of silently clamping them.
    pub fn validate(&self) -> Result<()> {
        if self.feed_addr.is_empty() {
            return Err(Error::Config("feed_addr empty"));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be nonzero"));
        }
        if self.reconnect_backoff_ms == 0 {
            return Err(Error::Config("reconnect_backoff_ms must be nonzero"));
        }
        if self.ewma_window == 0 {
            return Err(Error::Config("ewma_window must be at least 1"));
        }
        // Threshold ordering keeps the hysteresis gaps open; equal or
        // inverted thresholds would oscillate on every sample.
        if self.fan_fall_off_c >= self.fan_rise_half_c {
            return Err(Error::Config("fan_fall_off_c must be below fan_rise_half_c"));
        }
        if self.fan_fall_half_c >= self.fan_rise_full_c {
            return Err(Error::Config("fan_fall_half_c must be below fan_rise_full_c"));
        }
        if self.fan_rise_half_c >= self.fan_rise_full_c {
            return Err(Error::Config("fan_rise_half_c must be below fan_rise_full_c"));
        }
        if self.fan_fall_off_c >= self.fan_fall_half_c {
            return Err(Error::Config("fan_fall_off_c must be below fan_fall_half_c"));
        }
        Ok(())
    }
}
