//! Concrete adapters behind the port traits.
//!
//! This is the only code in the daemon that touches a device file or a
//! socket.

pub mod feed;
pub mod pi_blaster;
