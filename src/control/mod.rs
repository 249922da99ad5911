//! Control logic: blink state machines and thermal hysteresis.

pub mod blink;
pub mod thermal;
