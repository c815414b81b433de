//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pixelwire-core on top of portable abstractions:
//!
//! - LED strip banks over `smart_leds::SmartLedsWrite`
//! - Status LED liveness over a GPIO output pin

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod liveness;
