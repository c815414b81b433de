//! RP2040-specific HAL for the LED sink
//!
//! This crate provides RP2040 implementations of the shared `pixelwire-hal`
//! and `pixelwire-core` traits, plus RP2040-specific functionality:
//!
//! - GPIO allocation and config-driven pin lookup
//! - UART pin mapping
//! - PIO-based WS2812 transmission across several data pins

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pins;
pub mod pio;
pub mod uart;
pub mod ws2812;

pub use gpio::{GpioAllocator, LedPin};
pub use pins::{PinBank, PinError, RemainingPeripherals};
pub use ws2812::Ws2812Bank;
