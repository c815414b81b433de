//! Display driver trait for LED outputs

use smart_leds::RGB8;

use crate::pixels::Segment;

/// Errors that can occur while pushing pixels to an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Segment refers to an output the driver does not have
    InvalidOutput(u8),
    /// More pixels than the output can carry
    TooManyPixels,
    /// Hardware write failed
    Transmit,
}

/// Trait for pushing pixels to physical LED outputs
///
/// One call transmits one segment. The driver knows nothing about frames or
/// the decoder; it only maps `segment.output` to a data line.
pub trait DisplayDriver {
    /// Transmit `pixels` on the output named by `segment`
    ///
    /// `pixels.len()` equals `segment.count`.
    fn push_segment(&mut self, segment: &Segment, pixels: &[RGB8]) -> Result<(), DisplayError>;

    /// Set the global brightness scale (255 = full)
    fn set_brightness(&mut self, brightness: u8);
}
