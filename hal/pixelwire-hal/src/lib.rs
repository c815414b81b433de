//! Pixelwire Hardware Abstraction Layer
//!
//! Portable pin and serial abstractions shared by the driver crate and the
//! chip-specific HAL.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pixelwire-firmware / pixelwire-drivers │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixelwire-hal (this crate)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixelwire-hal-rp2040                   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! - [`gpio::OutputPin`] - Digital output
//! - [`uart::UartConfig`] - Serial line settings

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::OutputPin;
pub use uart::{DataBits, Parity, StopBits, UartConfig};
