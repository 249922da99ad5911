//! Board status controller library.
//!
//! Exposes the pure control logic (blink machines, thermal hysteresis,
//! connection supervision) for integration testing and external
//! inspection. Hardware and network adapters live under `adapters` and
//! plug into the port traits in `app::ports`.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod orchestrator;
pub mod report;
pub mod signals;
pub mod supervisor;

pub mod adapters;

mod error;

pub use error::{ActuatorError, Error, FeedError, Result};
