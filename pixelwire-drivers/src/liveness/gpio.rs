//! GPIO status LED
//!
//! Drives a liveness indicator directly from a GPIO pin.

use pixelwire_core::traits::LivenessSignal;
use pixelwire_hal::OutputPin;

/// Status LED on a GPIO pin
///
/// The pin can be configured as active-high (default) or active-low.
pub struct GpioLiveness<P> {
    pin: P,
    /// If true, LED on = pin LOW
    inverted: bool,
    /// Current logical state (true = LED on)
    active: bool,
}

impl<P: OutputPin> GpioLiveness<P> {
    /// Create a new status LED output
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the LED is on when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut led = Self {
            pin,
            inverted,
            active: false,
        };
        // Ensure LED starts off
        led.set(false);
        led
    }

    /// Create a status LED with active-high output
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a status LED with active-low output
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Check if the LED is currently on
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Release the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> LivenessSignal for GpioLiveness<P> {
    fn set(&mut self, active: bool) {
        self.active = active;
        // Normal: active=true, inverted=false → high
        // Inverted: active=true, inverted=true → low
        self.pin.set_state(active != self.inverted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
    }

    impl MockPin {
        fn new() -> Self {
            Self { high: false }
        }
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high_led() {
        let mut led = GpioLiveness::new_active_high(MockPin::new());

        // Initially off
        assert!(!led.is_active());
        assert!(!led.pin.is_set_high());

        led.set(true);
        assert!(led.is_active());
        assert!(led.pin.is_set_high());

        led.set(false);
        assert!(!led.is_active());
        assert!(!led.pin.is_set_high());
    }

    #[test]
    fn test_active_low_led() {
        let mut led = GpioLiveness::new_active_low(MockPin::new());

        // Initially off (pin is high for active-low)
        assert!(!led.is_active());
        assert!(led.pin.is_set_high());

        led.set(true);
        assert!(!led.pin.is_set_high());

        led.set(false);
        assert!(led.into_inner().is_set_high());
    }

    #[test]
    fn test_driven_by_heartbeat() {
        use pixelwire_core::liveness::Heartbeat;

        let mut led = GpioLiveness::new_active_high(MockPin::new());
        let mut heartbeat = Heartbeat::new(1000, 100);

        heartbeat.update(10, &mut led);
        assert!(led.pin.is_set_high());
        heartbeat.update(200, &mut led);
        assert!(!led.pin.is_set_high());
    }
}
