//! Blink-pattern state machine, one instance per indicator LED.
//!
//! The pure [`BlinkMachine`] decides a level per tick from the latest
//! [`IndicatorMode`]; the async [`blink_task`] wraps it in a select loop
//! that waits on either the tick timer or a fresh mode, whichever comes
//! first. Mode changes therefore take effect at the next tick boundary,
//! never mid-tick, which bounds reaction latency at one tick period.

use core::time::Duration;

use embassy_futures::select::{Either, select};
use log::{debug, error};

use crate::app::ports::{ActuatorChannel, ActuatorPort};
use crate::signals::{ExitReason, ModeSlot, request_shutdown};

/// How an indicator channel should visually behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorMode {
    /// LED held off.
    #[default]
    Off,
    /// LED toggles every tick (visible period = two ticks).
    Blinking,
    /// LED held on.
    Solid,
}

/// Internal tick state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlinkState {
    Off,
    BlinkingLow,
    BlinkingHigh,
    Solid,
}

/// Per-indicator state machine. The parity bit lives in the state itself:
/// `BlinkingHigh` wrote 1 on the last tick, `BlinkingLow` wrote 0.
pub struct BlinkMachine {
    state: BlinkState,
}

impl BlinkMachine {
    pub fn new() -> Self {
        Self {
            state: BlinkState::Off,
        }
    }

    /// Advance one tick under `mode` and return the level to write.
    ///
    /// Entering `Blinking` from any other state starts on the high phase,
    /// so the observable sequence after a mode change is 1,0,1,0,…
    pub fn on_tick(&mut self, mode: IndicatorMode) -> f32 {
        self.state = match (mode, self.state) {
            (IndicatorMode::Off, _) => BlinkState::Off,
            (IndicatorMode::Solid, _) => BlinkState::Solid,
            (IndicatorMode::Blinking, BlinkState::BlinkingHigh) => BlinkState::BlinkingLow,
            (IndicatorMode::Blinking, _) => BlinkState::BlinkingHigh,
        };
        match self.state {
            BlinkState::Off | BlinkState::BlinkingLow => 0.0,
            BlinkState::Solid | BlinkState::BlinkingHigh => 1.0,
        }
    }
}

impl Default for BlinkMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Async driver for one indicator channel.
///
/// Waits on the mode slot or the tick timer, whichever fires first. A mode
/// update only records the new target; the actuator is written on tick
/// boundaries exclusively, so there are no torn writes. An actuator failure
/// is fatal: the task raises the shutdown signal and exits.
pub async fn blink_task<A: ActuatorPort>(
    label: &'static str,
    channel: ActuatorChannel,
    inbox: &ModeSlot,
    actuator: &A,
    tick: Duration,
) {
    let mut machine = BlinkMachine::new();
    let mut mode = IndicatorMode::Off;

    // Known-off starting point before the first tick.
    if let Err(e) = actuator.set(channel, 0.0) {
        error!("{label}: initial actuator write failed: {e}");
        request_shutdown(ExitReason::ActuatorFault);
        return;
    }

    loop {
        match select(inbox.wait(), async_io_mini::Timer::after(tick)).await {
            Either::First(new_mode) => {
                if new_mode != mode {
                    debug!("{label}: mode -> {new_mode:?}");
                }
                mode = new_mode;
            }
            Either::Second(_) => {
                let level = machine.on_tick(mode);
                if let Err(e) = actuator.set(channel, level) {
                    error!("{label}: actuator write failed: {e}");
                    request_shutdown(ExitReason::ActuatorFault);
                    return;
                }
            }
        }
    }
}
