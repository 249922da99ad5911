//! Status report payload.
//!
//! One `StatusReport` arrives per feed message as JSON. The appliance sends
//! many more fields than the controller needs (message counters, uptime,
//! network statistics); serde ignores them. Every consumed field is
//! defaulted, so partial payloads decode to zero-equivalents rather than
//! failing the cycle.

use serde::Deserialize;

/// GPS solution state as reported by the appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpsSolution {
    /// No GPS receiver present or detected.
    #[default]
    Disconnected,
    /// Receiver present but no position fix yet.
    NoFix,
    /// Position fix acquired (2D, 3D, or augmented).
    Fixed,
}

impl From<&str> for GpsSolution {
    fn from(s: &str) -> Self {
        // The feed reports the fix grade as free text ("3D GPS + SBAS" etc.);
        // anything other than the two known-bad strings counts as a fix.
        match s {
            "" | "Disconnected" => Self::Disconnected,
            "No Fix" => Self::NoFix,
            _ => Self::Fixed,
        }
    }
}

impl<'de> Deserialize<'de> for GpsSolution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Immutable snapshot of appliance health, consumed once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct StatusReport {
    /// Board CPU temperature in Celsius.
    #[serde(rename = "CPUTemp", default)]
    pub cpu_temperature: f32,

    /// GPS solution state.
    #[serde(rename = "GPS_solution", default)]
    pub gps_solution: GpsSolution,

    /// UAT (978 MHz) messages decoded in the last minute.
    #[serde(rename = "UAT_messages_last_minute", default)]
    pub uat_messages_last_minute: u32,

    /// 1090ES messages decoded in the last minute.
    #[serde(rename = "ES_messages_last_minute", default)]
    pub es_messages_last_minute: u32,
}

impl StatusReport {
    /// Decode one feed message. Malformed payloads yield the zero-equivalent
    /// report; only the transport layer decides what counts as a link failure.
    pub fn decode(line: &str) -> Self {
        match serde_json::from_str(line) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("malformed status report ({e}); treating as empty");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_decodes() {
        let line = r#"{
            "Version": "v1.6",
            "CPUTemp": 48.2,
            "GPS_solution": "3D GPS + SBAS",
            "UAT_messages_last_minute": 12,
            "ES_messages_last_minute": 340,
            "Uptime": 123456
        }"#;
        let r = StatusReport::decode(line);
        assert!((r.cpu_temperature - 48.2).abs() < 0.001);
        assert_eq!(r.gps_solution, GpsSolution::Fixed);
        assert_eq!(r.uat_messages_last_minute, 12);
        assert_eq!(r.es_messages_last_minute, 340);
    }

    #[test]
    fn partial_payload_defaults_to_zero_equivalents() {
        let r = StatusReport::decode(r#"{"CPUTemp": 30.0}"#);
        assert_eq!(r.gps_solution, GpsSolution::Disconnected);
        assert_eq!(r.uat_messages_last_minute, 0);
        assert_eq!(r.es_messages_last_minute, 0);
    }

    #[test]
    fn malformed_payload_is_empty_report() {
        let r = StatusReport::decode("{not json");
        assert!((r.cpu_temperature - 0.0).abs() < f32::EPSILON);
        assert_eq!(r.gps_solution, GpsSolution::Disconnected);
    }

    #[test]
    fn gps_solution_strings() {
        assert_eq!(GpsSolution::from("Disconnected"), GpsSolution::Disconnected);
        assert_eq!(GpsSolution::from(""), GpsSolution::Disconnected);
        assert_eq!(GpsSolution::from("No Fix"), GpsSolution::NoFix);
        assert_eq!(GpsSolution::from("3D GPS"), GpsSolution::Fixed);
        assert_eq!(GpsSolution::from("Dead Reckoning"), GpsSolution::Fixed);
    }
}
