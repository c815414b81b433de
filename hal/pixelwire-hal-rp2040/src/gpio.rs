//! GPIO allocation and management
//!
//! Tracks which GPIO pins are in use so two roles in `sink.toml` cannot
//! claim the same pin.

use embassy_rp::gpio::{Level, Output};
use heapless::FnvIndexSet;
use pixelwire_core::config::SinkConfig;
use pixelwire_hal::OutputPin;

use crate::pins::GPIO_COUNT;

/// Pin allocation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AllocError {
    /// Pin number out of range
    InvalidPin(u8),
    /// Pin already claimed
    InUse(u8),
}

/// GPIO allocator to track pin usage
pub struct GpioAllocator {
    allocated: FnvIndexSet<u8, 32>,
}

impl Default for GpioAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioAllocator {
    pub fn new() -> Self {
        Self {
            allocated: FnvIndexSet::new(),
        }
    }

    /// Claim a GPIO pin
    pub fn allocate(&mut self, pin: u8) -> Result<(), AllocError> {
        if pin >= GPIO_COUNT {
            return Err(AllocError::InvalidPin(pin));
        }
        match self.allocated.insert(pin) {
            Ok(true) => Ok(()),
            _ => Err(AllocError::InUse(pin)),
        }
    }

    /// Release a GPIO pin
    pub fn release(&mut self, pin: u8) {
        self.allocated.remove(&pin);
    }

    pub fn is_allocated(&self, pin: u8) -> bool {
        self.allocated.contains(&pin)
    }

    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    /// Claim every pin the configuration names
    ///
    /// Order: serial TX, serial RX, status LED, then outputs.
    pub fn allocate_config(&mut self, config: &SinkConfig) -> Result<(), AllocError> {
        self.allocate(config.serial.tx_pin.pin)?;
        self.allocate(config.serial.rx_pin.pin)?;
        self.allocate(config.status_led.pin)?;
        for output in &config.outputs {
            self.allocate(output.pin.pin)?;
        }
        Ok(())
    }
}

/// Push-pull GPIO output driving an indicator LED
pub struct LedPin<'d> {
    output: Output<'d>,
}

impl<'d> LedPin<'d> {
    /// Start with the pin low
    pub fn new(output: Output<'d>) -> Self {
        Self { output }
    }

    /// Create from a raw pin
    pub fn from_pin(pin: embassy_rp::Peri<'d, embassy_rp::gpio::AnyPin>) -> Self {
        Self::new(Output::new(pin, Level::Low))
    }
}

impl OutputPin for LedPin<'_> {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator() {
        let mut alloc = GpioAllocator::new();

        assert!(alloc.allocate(11).is_ok());
        assert!(alloc.is_allocated(11));

        // Can't allocate same pin twice
        assert_eq!(alloc.allocate(11), Err(AllocError::InUse(11)));

        assert!(alloc.allocate(12).is_ok());
        assert_eq!(alloc.allocated_count(), 2);

        // Release and re-allocate
        alloc.release(11);
        assert!(!alloc.is_allocated(11));
        assert!(alloc.allocate(11).is_ok());
    }

    #[test]
    fn test_allocate_out_of_range() {
        let mut alloc = GpioAllocator::new();
        assert_eq!(alloc.allocate(30), Err(AllocError::InvalidPin(30)));
    }

    #[test]
    fn test_allocate_default_config() {
        let mut alloc = GpioAllocator::new();
        assert_eq!(alloc.allocate_config(&SinkConfig::default()), Ok(()));
        // TX, RX, status LED and three outputs
        assert_eq!(alloc.allocated_count(), 6);
    }

    #[test]
    fn test_allocate_config_conflict() {
        let mut config = SinkConfig::default();
        config.outputs[1].pin.pin = 17;

        let mut alloc = GpioAllocator::new();
        assert_eq!(alloc.allocate_config(&config), Err(AllocError::InUse(17)));
    }
}
