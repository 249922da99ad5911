//! Port traits — the boundary between control logic and the outside world.
//!
//! ```text
//!   StatusFeed ──▶ ConnectionSupervisor ──▶ ActuatorPort
//! ```
//!
//! Driven adapters (the pi-blaster device, the TCP feed client) implement
//! these traits. The controllers consume them via generics, so the control
//! core never touches a device file or a socket directly and the whole
//! system is testable with mock adapters.

use crate::error::{ActuatorError, FeedError};
use crate::report::StatusReport;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One physical output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorChannel {
    /// Power / link-health LED.
    Power,
    /// GPS status LED.
    Gps,
    /// Traffic (ADS-B reception) LED.
    Traffic,
    /// Primary cooling fan.
    FanA,
    /// Secondary cooling fan; always driven in tandem with FanA.
    FanB,
}

impl ActuatorChannel {
    /// All channels, in safe-off write order.
    pub const ALL: [Self; 5] = [
        Self::Power,
        Self::Gps,
        Self::Traffic,
        Self::FanA,
        Self::FanB,
    ];
}

/// Write-side port: the sole side-effecting boundary call.
///
/// Implementations must accept at least one write per channel per tick
/// without blocking indefinitely. A failing write is fatal to the daemon
/// (the orchestrator still attempts the safe-off path), so implementations
/// should not paper over errors.
///
/// Takes `&self` so one adapter instance can serve the blink tasks and the
/// supervisor thread concurrently; any interior state must be thread-safe.
pub trait ActuatorPort: Send + Sync {
    /// Drive `channel` to `level` (0.0 = off, 1.0 = full on).
    fn set(&self, channel: ActuatorChannel, level: f32) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Status feed port (driven adapter: upstream appliance → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: a message-oriented connection to the status source.
///
/// Blocking interface: the supervisor owns a dedicated thread and spends
/// its life inside `next_report()`. Any error ends the current connection;
/// the supervisor calls `connect()` again after its backoff.
pub trait StatusFeed {
    /// Establish the connection. Idempotent: replaces any prior connection.
    fn connect(&mut self) -> Result<(), FeedError>;

    /// Block until the next report arrives. Malformed payloads are decoded
    /// to the zero-equivalent report and are not an error.
    fn next_report(&mut self) -> Result<StatusReport, FeedError>;
}

// Forwarding impls so callers can hand out borrowed or shared handles.

impl<A: ActuatorPort + ?Sized> ActuatorPort for &A {
    fn set(&self, channel: ActuatorChannel, level: f32) -> Result<(), ActuatorError> {
        (**self).set(channel, level)
    }
}

impl<A: ActuatorPort + ?Sized> ActuatorPort for std::sync::Arc<A> {
    fn set(&self, channel: ActuatorChannel, level: f32) -> Result<(), ActuatorError> {
        (**self).set(channel, level)
    }
}

impl<F: StatusFeed + ?Sized> StatusFeed for &mut F {
    fn connect(&mut self) -> Result<(), FeedError> {
        (**self).connect()
    }
    fn next_report(&mut self) -> Result<StatusReport, FeedError> {
        (**self).next_report()
    }
}
