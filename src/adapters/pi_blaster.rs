//! pi-blaster PWM adapter.
//!
//! pi-blaster exposes a FIFO at `/dev/pi-blaster`; writing `"<pin>=<duty>\n"`
//! sets the PWM duty on a BCM pin. The file is opened per write and not held
//! open: the device tolerates it, every write is flushed immediately, and no
//! descriptor state is shared between the blink tasks and the supervisor
//! thread, which keeps `set` callable through `&self` from both.

use std::io::Write;
use std::path::PathBuf;

use log::{error, trace};

use crate::app::ports::{ActuatorChannel, ActuatorPort};
use crate::config::{PinConfig, SystemConfig};
use crate::error::ActuatorError;

/// `ActuatorPort` implementation over the pi-blaster device file.
#[derive(Debug, Clone)]
pub struct PiBlaster {
    device: PathBuf,
    pins: PinConfig,
}

impl PiBlaster {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            device: PathBuf::from(&config.device_path),
            pins: config.pins,
        }
    }

    fn pin(&self, channel: ActuatorChannel) -> u8 {
        match channel {
            ActuatorChannel::Power => self.pins.power,
            ActuatorChannel::Gps => self.pins.gps,
            ActuatorChannel::Traffic => self.pins.traffic,
            ActuatorChannel::FanA => self.pins.fan_a,
            ActuatorChannel::FanB => self.pins.fan_b,
        }
    }
}

impl ActuatorPort for PiBlaster {
    fn set(&self, channel: ActuatorChannel, level: f32) -> Result<(), ActuatorError> {
        if !(0.0..=1.0).contains(&level) {
            return Err(ActuatorError::LevelOutOfRange);
        }
        let pin = self.pin(channel);
        let command = format!("{pin}={level:.2}\n");
        trace!("pi-blaster: {:?} {}", channel, command.trim_end());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&self.device)
            .map_err(|e| {
                error!("pi-blaster: open {:?} failed: {e}", self.device);
                ActuatorError::DeviceOpenFailed
            })?;
        file.write_all(command.as_bytes()).map_err(|e| {
            error!("pi-blaster: write to {:?} failed: {e}", self.device);
            ActuatorError::WriteFailed
        })?;
        file.flush().map_err(|_| ActuatorError::WriteFailed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter_at(path: &std::path::Path) -> PiBlaster {
        let config = SystemConfig {
            device_path: path.to_string_lossy().into_owned(),
            ..SystemConfig::default()
        };
        PiBlaster::new(&config)
    }

    #[test]
    fn writes_pin_equals_duty_line() {
        let path = std::env::temp_dir().join("boardctl-piblaster-write-test");
        let adapter = adapter_at(&path);

        adapter.set(ActuatorChannel::Power, 1.0).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "26=1.00\n");

        adapter.set(ActuatorChannel::FanA, 0.5).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "13=0.50\n");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejects_out_of_range_level() {
        let path = std::env::temp_dir().join("boardctl-piblaster-range-test");
        let adapter = adapter_at(&path);
        assert_eq!(
            adapter.set(ActuatorChannel::Gps, 1.5),
            Err(ActuatorError::LevelOutOfRange)
        );
        assert_eq!(
            adapter.set(ActuatorChannel::Gps, -0.1),
            Err(ActuatorError::LevelOutOfRange)
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_device_is_an_open_error() {
        let adapter = adapter_at(std::path::Path::new("/nonexistent-dir/pi-blaster"));
        assert_eq!(
            adapter.set(ActuatorChannel::Traffic, 0.0),
            Err(ActuatorError::DeviceOpenFailed)
        );
    }
}
