//! Inter-task signal slots.
//!
//! Uses `embassy-sync` signals for all cross-task communication. A
//! [`Signal`] is a single-slot mailbox: a new value overwrites any unread
//! one, so a blink task always acts on the most recently published mode and
//! never drains a backlog of stale modes. No queues, no locks held across
//! await points.
//!
//! ```text
//! ┌────────────────────┐  ModeSlot ×3  ┌──────────────┐
//! │ ConnectionSupervisor│─────────────▶│ blink tasks  │
//! │   (OS thread)       │              │ (executor)   │
//! └────────────────────┘              └──────────────┘
//!          │                    SHUTDOWN ▲      │
//!          └────────────────────────────┴──────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::control::blink::IndicatorMode;

/// Single-slot mode mailbox for one indicator channel.
pub type ModeSlot = Signal<CriticalSectionRawMutex, IndicatorMode>;

/// The three indicator mode slots, bundled so the supervisor can be handed
/// (and tested against) a non-global set.
pub struct ModeSlots {
    pub power: ModeSlot,
    pub gps: ModeSlot,
    pub traffic: ModeSlot,
}

impl ModeSlots {
    pub const fn new() -> Self {
        Self {
            power: Signal::new(),
            gps: Signal::new(),
            traffic: Signal::new(),
        }
    }
}

impl Default for ModeSlots {
    fn default() -> Self {
        Self::new()
    }
}

/// Global mode slots wired between the supervisor and the blink tasks.
pub static MODES: ModeSlots = ModeSlots::new();

/// Why the daemon is exiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Operator interrupt (SIGINT/SIGTERM).
    Interrupt,
    /// An actuator write failed; the control path is unrecoverable.
    ActuatorFault,
}

/// Process-wide shutdown signal. Single-slot: a later reason overwrites an
/// unread earlier one, and whichever reason is in the slot when the
/// orchestrator wakes is the one reported. The orchestrator re-arms the
/// slot after waking so late `signaled()` checks still observe shutdown.
pub static SHUTDOWN: Signal<CriticalSectionRawMutex, ExitReason> = Signal::new();

/// Raise the shutdown signal. Safe to call from any thread or task.
pub fn request_shutdown(reason: ExitReason) {
    SHUTDOWN.signal(reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_slot_overwrites_never_queues() {
        let slot: ModeSlot = Signal::new();
        slot.signal(IndicatorMode::Blinking);
        slot.signal(IndicatorMode::Solid);
        assert_eq!(slot.try_take(), Some(IndicatorMode::Solid));
        assert_eq!(slot.try_take(), None);
    }
}
