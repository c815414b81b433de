//! Liveness timing
//!
//! Pure timing logic for the status LED. Both types are driven by a
//! millisecond timestamp so they can be tested without hardware.

pub mod blink;
pub mod heartbeat;

pub use blink::{Blink, STARTUP_BLINK};
pub use heartbeat::Heartbeat;
