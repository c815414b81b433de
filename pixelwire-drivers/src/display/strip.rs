//! Bank of independent LED strips
//!
//! Wraps one `SmartLedsWrite` writer per output. Useful when every output
//! has its own transmitter (SPI bus, RMT channel, dedicated PIO state
//! machine) rather than sharing one.

use pixelwire_core::pixels::Segment;
use pixelwire_core::traits::{DisplayDriver, DisplayError};
use smart_leds::{brightness, SmartLedsWrite, RGB8};

/// `N` LED strips indexed by output number
pub struct StripBank<W, const N: usize> {
    strips: [W; N],
    brightness: u8,
}

impl<W, const N: usize> StripBank<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    /// Create a bank at full brightness
    pub fn new(strips: [W; N]) -> Self {
        Self {
            strips,
            brightness: 255,
        }
    }

    /// Current brightness scale
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Access one strip
    pub fn strip_mut(&mut self, output: u8) -> Option<&mut W> {
        self.strips.get_mut(output as usize)
    }
}

impl<W, const N: usize> DisplayDriver for StripBank<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    fn push_segment(&mut self, segment: &Segment, pixels: &[RGB8]) -> Result<(), DisplayError> {
        let level = self.brightness;
        let strip = self
            .strips
            .get_mut(segment.output as usize)
            .ok_or(DisplayError::InvalidOutput(segment.output))?;

        strip
            .write(brightness(pixels.iter().copied(), level))
            .map_err(|_| DisplayError::Transmit)
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }
}
