//! Process lifecycle: startup self-test, task spawning, shutdown, safe-off.
//!
//! All control decisions live in the controllers. One OS thread
//! runs the connection supervisor (its feed port blocks); the calling
//! thread drives the three blink tasks on a single-threaded executor until
//! the shutdown signal fires, then performs the mandatory safe-off writes.
//!
//! Every writer shares one [`GuardedActuator`]: once the safe-off pass has
//! run, the guard refuses further writes, so a supervisor thread still
//! blocked on its feed cannot undo the safe state with a late report.
//!
//! ```text
//!  main thread                          "supervisor" thread
//!  ┌─────────────────────────────┐      ┌─────────────────────┐
//!  │ LocalExecutor               │      │ ConnectionSupervisor │
//!  │  blink(power)               │◀─────│  feed / modes / fan  │
//!  │  blink(gps)    MODES slots  │      └──────────┬──────────┘
//!  │  blink(traffic)             │                 │
//!  │  run(SHUTDOWN.wait())       │                 │
//!  └──────────────┬──────────────┘                 │
//!                 └──────▶ GuardedActuator ◀───────┘
//! ```

use core::time::Duration;
use std::sync::{Arc, Mutex, PoisonError};

use log::{error, info};

use crate::app::ports::{ActuatorChannel, ActuatorPort, StatusFeed};
use crate::config::SystemConfig;
use crate::control::blink::blink_task;
use crate::error::{ActuatorError, Error, Result};
use crate::signals::{ExitReason, MODES, SHUTDOWN, request_shutdown};
use crate::supervisor::ConnectionSupervisor;

/// Run the daemon until shutdown. Returns the exit reason, with every
/// actuator channel driven to the safe-off state first.
///
/// The interrupt listener is the caller's job (it is process wiring, not
/// control logic); it only has to call
/// [`request_shutdown`](crate::signals::request_shutdown).
pub fn run<F, A>(config: &SystemConfig, feed: F, actuator: A) -> Result<ExitReason>
where
    F: StatusFeed + Send + 'static,
    A: ActuatorPort + 'static,
{
    let tick = Duration::from_millis(config.tick_interval_ms);
    let actuator = Arc::new(GuardedActuator::new(actuator));

    self_test(&actuator, tick)?;

    // Fans stay off until the first temperature reading arrives.
    actuator.set(ActuatorChannel::FanA, 0.0)?;
    actuator.set(ActuatorChannel::FanB, 0.0)?;

    spawn_supervisor(config, feed, Arc::clone(&actuator))?;

    // Blink tasks plus the shutdown waiter share one executor thread.
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor
        .spawn(blink_task(
            "power",
            ActuatorChannel::Power,
            &MODES.power,
            &actuator,
            tick,
        ))
        .detach();
    executor
        .spawn(blink_task(
            "gps",
            ActuatorChannel::Gps,
            &MODES.gps,
            &actuator,
            tick,
        ))
        .detach();
    executor
        .spawn(blink_task(
            "traffic",
            ActuatorChannel::Traffic,
            &MODES.traffic,
            &actuator,
            tick,
        ))
        .detach();

    info!("steady-state control running");
    let reason = futures_lite::future::block_on(executor.run(SHUTDOWN.wait()));

    // Waiting consumed the signal; re-arm it so the supervisor thread's
    // own shutdown checks still observe it.
    SHUTDOWN.signal(reason);

    info!("shutting down: {reason:?}");
    actuator.safe_off();
    Ok(reason)
}

fn spawn_supervisor<F, A>(config: &SystemConfig, feed: F, actuator: A) -> Result<()>
where
    F: StatusFeed + Send + 'static,
    A: ActuatorPort + 'static,
{
    let config = config.clone();
    std::thread::Builder::new()
        .name("supervisor".into())
        .spawn(move || {
            let mut supervisor = ConnectionSupervisor::new(feed, actuator, &MODES, &config);
            if let Err(e) = supervisor.run() {
                error!("supervisor failed: {e}");
                request_shutdown(ExitReason::ActuatorFault);
            }
        })
        .map_err(|_| Error::Config("supervisor thread spawn failed"))?;
    Ok(())
}

/// Fixed visual self-test before steady-state control: all indicators on
/// for one tick, off for one tick, twice over.
fn self_test<A: ActuatorPort>(actuator: &A, period: Duration) -> Result<()> {
    const INDICATORS: [ActuatorChannel; 3] = [
        ActuatorChannel::Power,
        ActuatorChannel::Gps,
        ActuatorChannel::Traffic,
    ];

    info!("indicator self-test");
    for _ in 0..2 {
        for channel in INDICATORS {
            actuator.set(channel, 1.0)?;
        }
        std::thread::sleep(period);
        for channel in INDICATORS {
            actuator.set(channel, 0.0)?;
        }
        std::thread::sleep(period);
    }
    Ok(())
}

/// Actuator wrapper whose writes stop at teardown.
///
/// `safe_off` holds the same lock as `set` while it drives every channel
/// to zero and marks the guard torn down, so a concurrent write either
/// lands before the zeros or is refused; nothing can land after them.
struct GuardedActuator<A> {
    inner: A,
    torn_down: Mutex<bool>,
}

impl<A: ActuatorPort> GuardedActuator<A> {
    fn new(inner: A) -> Self {
        Self {
            inner,
            torn_down: Mutex::new(false),
        }
    }

    /// Mandatory cleanup: every channel off, then no further writes.
    /// Individual failures are logged and skipped so one dead channel
    /// cannot stop the rest from clearing.
    fn safe_off(&self) {
        let mut torn_down = self
            .torn_down
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for channel in ActuatorChannel::ALL {
            if let Err(e) = self.inner.set(channel, 0.0) {
                error!("safe-off write for {channel:?} failed: {e}");
            }
        }
        *torn_down = true;
    }
}

impl<A: ActuatorPort> ActuatorPort for GuardedActuator<A> {
    fn set(&self, channel: ActuatorChannel, level: f32) -> core::result::Result<(), ActuatorError> {
        let torn_down = self
            .torn_down
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *torn_down {
            return Ok(());
        }
        self.inner.set(channel, level)
    }
}
