//! Teardown guarantee: no actuator write may land after the safe-off pass.
//!
//! The supervisor thread can be blocked inside its feed read when the
//! shutdown signal fires; a report released to it afterwards must not be
//! able to rewrite channels already driven to zero. Single test binary:
//! the orchestrator runs against the process-wide mode slots and shutdown
//! signal.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use boardctl::ActuatorError;
use boardctl::FeedError;
use boardctl::app::ports::{ActuatorChannel, ActuatorPort, StatusFeed};
use boardctl::config::SystemConfig;
use boardctl::orchestrator;
use boardctl::report::StatusReport;
use boardctl::signals::{ExitReason, request_shutdown};

#[derive(Clone, Default)]
struct SharedActuator {
    writes: Arc<Mutex<Vec<(ActuatorChannel, f32)>>>,
}

impl ActuatorPort for SharedActuator {
    fn set(&self, channel: ActuatorChannel, level: f32) -> Result<(), ActuatorError> {
        self.writes.lock().unwrap().push((channel, level));
        Ok(())
    }
}

/// Hands out whatever the test sends it; blocks in between.
struct ChannelFeed {
    reports: mpsc::Receiver<StatusReport>,
}

impl StatusFeed for ChannelFeed {
    fn connect(&mut self) -> Result<(), FeedError> {
        Ok(())
    }

    fn next_report(&mut self) -> Result<StatusReport, FeedError> {
        self.reports.recv().map_err(|_| FeedError::Closed)
    }
}

#[test]
fn late_report_cannot_write_after_safe_off() {
    let config = SystemConfig {
        tick_interval_ms: 10,
        reconnect_backoff_ms: 10,
        ewma_window: 1,
        ..SystemConfig::default()
    };

    let (tx, rx) = mpsc::channel();
    // One warm report up front so the supervisor is mid-session when the
    // interrupt arrives.
    tx.send(StatusReport {
        cpu_temperature: 42.0,
        ..StatusReport::default()
    })
    .unwrap();

    std::thread::spawn(|| {
        std::thread::sleep(Duration::from_millis(150));
        request_shutdown(ExitReason::Interrupt);
    });

    let actuator = SharedActuator::default();
    let reason =
        orchestrator::run(&config, ChannelFeed { reports: rx }, actuator.clone()).unwrap();
    assert_eq!(reason, ExitReason::Interrupt);

    let settled = actuator.writes.lock().unwrap().len();

    // Release a hot report to the still-parked supervisor thread. Without
    // the teardown gate this would drive both fans back up.
    tx.send(StatusReport {
        cpu_temperature: 90.0,
        ..StatusReport::default()
    })
    .unwrap();
    std::thread::sleep(Duration::from_millis(100));

    let writes = actuator.writes.lock().unwrap().clone();
    assert_eq!(
        writes.len(),
        settled,
        "writes landed after safe-off: {:?}",
        &writes[settled..]
    );

    // And the final writes are still the safe-off zeros, every channel.
    let safe_off: Vec<(ActuatorChannel, f32)> = ActuatorChannel::ALL
        .into_iter()
        .map(|channel| (channel, 0.0))
        .collect();
    assert_eq!(&writes[writes.len() - safe_off.len()..], &safe_off[..]);
}
