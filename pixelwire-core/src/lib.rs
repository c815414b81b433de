//! Board-agnostic core logic for the LED sink
//!
//! This crate contains everything between the serial byte stream and the
//! LED outputs that does not depend on specific hardware:
//!
//! - Collaborator traits (byte source, display driver, liveness, clock)
//! - Pixel buffer and the segment map that splits it across outputs
//! - Heartbeat and blink timing
//! - The cooperative poll loop ([`sink::Sink::tick`])
//! - Configuration types and the text config parser

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod liveness;
pub mod pixels;
pub mod sink;
pub mod traits;

pub use smart_leds::RGB8;
