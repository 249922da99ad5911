//! Thermal controller: EWMA-smoothed CPU temperature to discrete fan level.
//!
//! The raw CPU temperature is noisy enough to cross a threshold on every
//! other report, so two mechanisms keep the fan quiet: an exponentially
//! weighted moving average over roughly five samples, and asymmetric
//! rise/fall thresholds per level. The result is that a constant input
//! always stabilises to one level and stays there.
//!
//! ## Hysteresis table
//!
//! | Current | Rise            | Fall                      |
//! |---------|-----------------|---------------------------|
//! | Off     | >= 40 C -> Half | —                         |
//! | Half    | >= 50 C -> Full | <= 35 C -> Off            |
//! | Full    | —               | <= 35 C -> Off, <= 45 C -> Half |
//!
//! Fall thresholds are checked most-extreme-first, so a deep drop at Full
//! goes straight to Off without passing through Half.

use crate::config::SystemConfig;

/// Discrete fan speed level, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FanLevel {
    #[default]
    Off,
    Half,
    Full,
}

impl FanLevel {
    /// PWM duty for this level.
    pub fn duty(self) -> f32 {
        match self {
            Self::Off => 0.0,
            Self::Half => 0.5,
            Self::Full => 1.0,
        }
    }
}

/// Exponentially weighted moving average, seeded with the first sample.
#[derive(Debug, Clone, Copy)]
struct Ewma {
    alpha: f64,
    value: Option<f64>,
}

impl Ewma {
    /// `window` is the nominal averaging window in samples; alpha = 2/(n+1).
    /// A window of 1 passes samples through unsmoothed.
    fn new(window: u32) -> Self {
        Self {
            alpha: 2.0 / (f64::from(window.max(1)) + 1.0),
            value: None,
        }
    }

    fn add(&mut self, sample: f64) -> f64 {
        let next = match self.value {
            None => sample,
            Some(prev) => prev + self.alpha * (sample - prev),
        };
        self.value = Some(next);
        next
    }
}

/// Maps smoothed temperature samples to fan-level transitions.
pub struct ThermalController {
    avg: Ewma,
    level: FanLevel,
    rise_half: f64,
    rise_full: f64,
    fall_half: f64,
    fall_off: f64,
}

impl ThermalController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            avg: Ewma::new(config.ewma_window),
            level: FanLevel::Off,
            rise_half: config.fan_rise_half_c,
            rise_full: config.fan_rise_full_c,
            fall_half: config.fan_fall_half_c,
            fall_off: config.fan_fall_off_c,
        }
    }

    /// Feed one temperature sample. Returns the new level when it changes,
    /// `None` otherwise, so the caller issues exactly one actuator write
    /// per fan channel per transition.
    pub fn observe(&mut self, temp_c: f32) -> Option<FanLevel> {
        let temp = self.avg.add(f64::from(temp_c));

        let next = match self.level {
            FanLevel::Off => {
                if temp >= self.rise_half {
                    FanLevel::Half
                } else {
                    FanLevel::Off
                }
            }
            FanLevel::Half => {
                if temp <= self.fall_off {
                    FanLevel::Off
                } else if temp >= self.rise_full {
                    FanLevel::Full
                } else {
                    FanLevel::Half
                }
            }
            FanLevel::Full => {
                // Most extreme fall threshold first: the lowest level
                // reachable in one step wins.
                if temp <= self.fall_off {
                    FanLevel::Off
                } else if temp <= self.fall_half {
                    FanLevel::Half
                } else {
                    FanLevel::Full
                }
            }
        };

        if next == self.level {
            return None;
        }
        self.level = next;
        Some(next)
    }

    /// Current discrete level.
    pub fn level(&self) -> FanLevel {
        self.level
    }

    /// Current smoothed temperature, if any sample has been observed.
    pub fn smoothed(&self) -> Option<f64> {
        self.avg.value
    }

    /// Resynchronise the discrete state with a level applied outside the
    /// controller (the supervisor's fail-safe Full while the link is down).
    pub fn force_level(&mut self, level: FanLevel) {
        self.level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(window: u32) -> ThermalController {
        let config = SystemConfig {
            ewma_window: window,
            ..SystemConfig::default()
        };
        ThermalController::new(&config)
    }

    fn trace(ctrl: &mut ThermalController, samples: &[f32]) -> Vec<FanLevel> {
        samples
            .iter()
            .map(|&t| {
                let _ = ctrl.observe(t);
                ctrl.level()
            })
            .collect()
    }

    #[test]
    fn hysteresis_trace_unsmoothed() {
        // Window 1 disables smoothing so the table is exercised directly.
        let mut ctrl = controller(1);
        use FanLevel::{Full, Half, Off};
        assert_eq!(
            trace(&mut ctrl, &[30.0, 42.0, 42.0, 52.0, 42.0, 36.0, 30.0]),
            vec![Off, Half, Half, Full, Half, Half, Off]
        );
    }

    #[test]
    fn full_drops_straight_to_off_on_deep_fall() {
        let mut ctrl = controller(1);
        let _ = ctrl.observe(45.0);
        let _ = ctrl.observe(55.0);
        assert_eq!(ctrl.level(), FanLevel::Full);
        assert_eq!(ctrl.observe(30.0), Some(FanLevel::Off));
    }

    #[test]
    fn off_rises_one_step_even_when_far_over_full_threshold() {
        let mut ctrl = controller(1);
        assert_eq!(ctrl.observe(70.0), Some(FanLevel::Half));
        assert_eq!(ctrl.observe(70.0), Some(FanLevel::Full));
    }

    #[test]
    fn constant_input_stabilises() {
        let mut ctrl = controller(5);
        let mut changes = 0;
        for _ in 0..50 {
            if ctrl.observe(47.0).is_some() {
                changes += 1;
            }
        }
        // One Off->Half transition once the average crosses 40, then steady.
        assert_eq!(changes, 1);
        assert_eq!(ctrl.level(), FanLevel::Half);
    }

    #[test]
    fn no_oscillation_inside_the_dead_band() {
        let mut ctrl = controller(1);
        let _ = ctrl.observe(42.0); // Half
        for t in [38.0, 44.0, 39.0, 43.0, 36.0, 48.0] {
            assert_eq!(ctrl.observe(t), None, "dead-band sample {t} moved the level");
        }
        assert_eq!(ctrl.level(), FanLevel::Half);
    }

    #[test]
    fn smoothing_delays_threshold_crossing() {
        let mut ctrl = controller(5);
        assert_eq!(ctrl.observe(30.0), None);
        // A single hot sample is damped below the rise threshold.
        assert_eq!(ctrl.observe(55.0), None);
        assert!(ctrl.smoothed().unwrap() < 39.0);
        // Sustained heat gets through.
        assert_eq!(ctrl.observe(55.0), Some(FanLevel::Half));
    }

    #[test]
    fn force_level_resyncs_hysteresis() {
        let mut ctrl = controller(1);
        ctrl.force_level(FanLevel::Full);
        // Descends through the Full row, not the Off row.
        assert_eq!(ctrl.observe(44.0), Some(FanLevel::Half));
        assert_eq!(ctrl.observe(30.0), Some(FanLevel::Off));
    }

    #[test]
    fn duty_mapping() {
        assert!((FanLevel::Off.duty() - 0.0).abs() < f32::EPSILON);
        assert!((FanLevel::Half.duty() - 0.5).abs() < f32::EPSILON);
        assert!((FanLevel::Full.duty() - 1.0).abs() < f32::EPSILON);
    }
}
