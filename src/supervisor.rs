//! Connection supervisor.
//!
//! Owns the status-feed lifecycle and translates each report into
//! indicator modes and fan commands. Runs on a dedicated OS thread for the
//! life of the process, because the feed port blocks.
//!
//! ## Link state machine
//!
//! ```text
//! Connecting ──connect ok──▶ Connected ──read error──▶ Down
//!     ▲  ▲                                              │
//!     │  └──────connect error─────▶ Down ──backoff──────┘
//!     └──────────────────backoff────┘
//! ```
//!
//! Entering `Down` forces a defined degraded posture before any retry:
//! power blinking (the operator's "link down" cue), GPS and traffic off,
//! and both fan channels at full as the thermal fail-safe. Retries continue
//! forever with a fixed backoff; this daemon runs unattended.

use core::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{ActuatorChannel, ActuatorPort, StatusFeed};
use crate::config::SystemConfig;
use crate::control::blink::IndicatorMode;
use crate::control::thermal::{FanLevel, ThermalController};
use crate::report::{GpsSolution, StatusReport};
use crate::signals::{ModeSlots, SHUTDOWN};
use crate::error::Result;

/// Connectivity of the status-feed link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Connected,
    Down,
}

// ───────────────────────────────────────────────────────────────
// Report -> mode derivation (pure)
// ───────────────────────────────────────────────────────────────

/// GPS LED: off without a receiver, blinking while searching, solid on fix.
pub fn gps_mode(solution: GpsSolution) -> IndicatorMode {
    match solution {
        GpsSolution::Disconnected => IndicatorMode::Off,
        GpsSolution::NoFix => IndicatorMode::Blinking,
        GpsSolution::Fixed => IndicatorMode::Solid,
    }
}

/// Traffic LED: solid with data on both bands, blinking on one, else off.
///
/// The ES band needs more than one message a minute to count; a single
/// stray decode is indistinguishable from noise.
pub fn traffic_mode(uat_last_minute: u32, es_last_minute: u32) -> IndicatorMode {
    match (uat_last_minute > 0, es_last_minute > 1) {
        (true, true) => IndicatorMode::Solid,
        (true, false) | (false, true) => IndicatorMode::Blinking,
        (false, false) => IndicatorMode::Off,
    }
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

/// Owns the feed, the thermal controller, and the link state machine.
///
/// Generic over the feed and actuator ports; the mode slots are injected so
/// tests can observe published modes without touching the process globals.
pub struct ConnectionSupervisor<'a, F, A> {
    feed: F,
    actuator: A,
    slots: &'a ModeSlots,
    thermal: ThermalController,
    link: LinkState,
    backoff: Duration,
    published: PublishedModes,
}

/// Last mode published per indicator slot. Modes are re-published only on
/// change: every signal restarts the receiving blink task's tick wait, so
/// a chatty feed must not be able to re-arm the timers faster than they
/// fire.
#[derive(Debug, Default)]
struct PublishedModes {
    power: Option<IndicatorMode>,
    gps: Option<IndicatorMode>,
    traffic: Option<IndicatorMode>,
}

impl<'a, F, A> ConnectionSupervisor<'a, F, A>
where
    F: StatusFeed,
    A: ActuatorPort,
{
    pub fn new(feed: F, actuator: A, slots: &'a ModeSlots, config: &SystemConfig) -> Self {
        Self {
            feed,
            actuator,
            slots,
            thermal: ThermalController::new(config),
            link: LinkState::Connecting,
            backoff: Duration::from_millis(config.reconnect_backoff_ms),
            published: PublishedModes::default(),
        }
    }

    /// Blocking loop for the life of the process.
    ///
    /// Returns `Ok(())` only when shutdown has been requested elsewhere;
    /// returns `Err` on a fatal actuator failure, which the orchestrator
    /// thread wrapper converts into the shutdown signal.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if SHUTDOWN.signaled() {
                return Ok(());
            }

            self.link = LinkState::Connecting;
            match self.feed.connect() {
                Ok(()) => {
                    self.link = LinkState::Connected;
                    info!("status feed connected");
                    self.read_until_failure()?;
                }
                Err(e) => warn!("status feed connect failed: {e}"),
            }

            // Teardown owns the actuators from here; no down posture.
            if SHUTDOWN.signaled() {
                return Ok(());
            }

            self.enter_down()?;
            std::thread::sleep(self.backoff);
        }
    }

    /// Process reports until the feed errors or shutdown is requested. A
    /// feed error is consumed here (it drives the Down cycle); an actuator
    /// error propagates.
    fn read_until_failure(&mut self) -> Result<()> {
        loop {
            match self.feed.next_report() {
                Ok(report) => {
                    // A report that arrives during teardown must not be
                    // allowed to rewrite channels already driven safe-off.
                    if SHUTDOWN.signaled() {
                        return Ok(());
                    }
                    self.handle_report(&report)?;
                }
                Err(e) => {
                    warn!("status feed lost: {e}");
                    return Ok(());
                }
            }
        }
    }

    /// Apply one report: thermal first, then the three indicator modes.
    /// Everything derived from one report lands before the next is read.
    pub fn handle_report(&mut self, report: &StatusReport) -> Result<()> {
        if let Some(level) = self.thermal.observe(report.cpu_temperature) {
            debug!(
                "fan level -> {level:?} (smoothed {:.2} C)",
                self.thermal.smoothed().unwrap_or_default()
            );
            self.set_fans(level.duty())?;
        }

        // A processed report is itself the health signal (power solid).
        self.publish(
            IndicatorMode::Solid,
            gps_mode(report.gps_solution),
            traffic_mode(
                report.uat_messages_last_minute,
                report.es_messages_last_minute,
            ),
        );
        Ok(())
    }

    /// Degraded posture on link loss: power blinks the error indication,
    /// GPS and traffic go dark, and the fan runs full until the link (and
    /// with it the temperature reading) comes back.
    pub fn enter_down(&mut self) -> Result<()> {
        self.link = LinkState::Down;
        self.publish(IndicatorMode::Blinking, IndicatorMode::Off, IndicatorMode::Off);
        self.set_fans(FanLevel::Full.duty())?;
        self.thermal.force_level(FanLevel::Full);
        Ok(())
    }

    /// Signal each slot whose mode differs from the last published value.
    fn publish(&mut self, power: IndicatorMode, gps: IndicatorMode, traffic: IndicatorMode) {
        if self.published.power != Some(power) {
            self.slots.power.signal(power);
            self.published.power = Some(power);
        }
        if self.published.gps != Some(gps) {
            self.slots.gps.signal(gps);
            self.published.gps = Some(gps);
        }
        if self.published.traffic != Some(traffic) {
            self.slots.traffic.signal(traffic);
            self.published.traffic = Some(traffic);
        }
    }

    fn set_fans(&self, duty: f32) -> Result<()> {
        self.actuator.set(ActuatorChannel::FanA, duty)?;
        self.actuator.set(ActuatorChannel::FanB, duty)?;
        Ok(())
    }

    pub fn link(&self) -> LinkState {
        self.link
    }
}
