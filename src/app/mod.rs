//! Domain-facing boundary of the daemon.

pub mod ports;
