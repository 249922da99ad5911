//! Unified error types for the boardctl daemon.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! orchestrator's error handling uniform. All variants are `Copy` so they can
//! be passed through the shutdown path without allocation; I/O detail is
//! logged at the point of failure.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level daemon error
// ---------------------------------------------------------------------------

/// Every fallible operation in the daemon funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An actuator command failed. Fatal: the physical control path is
    /// assumed unrecoverable without operator intervention.
    Actuator(ActuatorError),
    /// The status feed failed. Transient: handled by the supervisor's
    /// down/backoff/retry cycle and never escapes it.
    Feed(FeedError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Feed(e) => write!(f, "feed: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The PWM device could not be opened.
    DeviceOpenFailed,
    /// Writing the channel command to the device failed.
    WriteFailed,
    /// Requested level is outside 0.0..=1.0.
    LevelOutOfRange,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceOpenFailed => write!(f, "device open failed"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::LevelOutOfRange => write!(f, "level out of range"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Status-feed errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedError {
    /// Connecting to the feed address failed.
    ConnectFailed,
    /// The remote end closed the stream.
    Closed,
    /// A read from the stream failed mid-message.
    ReadFailed,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::Closed => write!(f, "stream closed by remote"),
            Self::ReadFailed => write!(f, "read failed"),
        }
    }
}

impl From<FeedError> for Error {
    fn from(e: FeedError) -> Self {
        Self::Feed(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Daemon-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
