//! Liveness indicator drivers

pub mod gpio;

pub use gpio::GpioLiveness;
