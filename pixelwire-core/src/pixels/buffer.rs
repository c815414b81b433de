//! Fixed-capacity pixel buffer

use heapless::Vec;
use pixelwire_protocol::{serpentine_index, BYTES_PER_PIXEL, MAX_PIXELS};
use smart_leds::RGB8;

use super::segment::SegmentMap;
use crate::traits::{DisplayDriver, DisplayError};

/// Payload does not fit the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApplyError {
    /// `offset + len` runs past the end of the buffer (all in bytes)
    OutOfRange {
        offset: usize,
        len: usize,
        capacity: usize,
    },
}

/// First, middle and last pixel of the buffer
///
/// Used for the per-frame diagnostic log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameSummary {
    pub first: [u8; 3],
    pub middle: [u8; 3],
    pub last: [u8; 3],
}

/// Ordered RGB pixel storage shared by all outputs
///
/// Capacity is fixed at construction and the buffer is never resized.
/// Contents change only through [`PixelBuffer::apply`]. Pixels are stored
/// in chain order, so a serpentine matrix is reordered on the way in.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pixels: Vec<RGB8, MAX_PIXELS>,
    /// Byte position where payloads start
    start_offset: usize,
    /// Row width of a serpentine wired matrix
    serpentine_width: Option<usize>,
}

impl PixelBuffer {
    /// Create a black buffer of `capacity` pixels (clamped to [`MAX_PIXELS`])
    pub fn new(capacity: usize) -> Self {
        let mut pixels = Vec::new();
        // Cannot fail: clamped to the Vec capacity
        let _ = pixels.resize(capacity.min(MAX_PIXELS), RGB8::default());
        Self {
            pixels,
            start_offset: 0,
            serpentine_width: None,
        }
    }

    /// Start payloads at pixel `start` instead of the first pixel
    ///
    /// Offsets past the end are clamped to the capacity.
    pub fn with_start_offset(mut self, start: usize) -> Self {
        self.start_offset = start.min(self.pixels.len()) * BYTES_PER_PIXEL;
        self
    }

    /// Treat the buffer as a matrix `width` pixels wide whose odd rows are
    /// wired right to left
    ///
    /// Payloads stay row-major; [`PixelBuffer::apply`] reverses odd rows as
    /// it writes. A zero width leaves the order unchanged.
    pub fn with_serpentine(mut self, width: usize) -> Self {
        self.serpentine_width = (width > 0).then_some(width);
        self
    }

    /// Row width when odd rows are reversed
    pub fn serpentine_width(&self) -> Option<usize> {
        self.serpentine_width
    }

    /// Capacity in pixels
    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    /// Capacity in bytes
    pub fn byte_capacity(&self) -> usize {
        self.pixels.len() * BYTES_PER_PIXEL
    }

    /// Byte position where payloads start
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Largest payload, in bytes, that fits after the start offset
    pub fn payload_capacity(&self) -> usize {
        self.byte_capacity() - self.start_offset
    }

    /// All pixels
    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.pixels.fill(RGB8::default());
    }

    /// Copy a validated payload into the buffer
    ///
    /// Every three bytes become one pixel, starting at the start offset. A
    /// trailing partial triple only updates its leading channels. Either the
    /// whole payload is written or, if it does not fit, nothing is.
    /// Offsets and lengths count in row-major order.
    pub fn apply(&mut self, payload: &[u8]) -> Result<(), ApplyError> {
        let offset = self.start_offset;
        if offset + payload.len() > self.byte_capacity() {
            return Err(ApplyError::OutOfRange {
                offset,
                len: payload.len(),
                capacity: self.byte_capacity(),
            });
        }

        for (i, &byte) in payload.iter().enumerate() {
            let pos = offset + i;
            let index = self.chain_index(pos / BYTES_PER_PIXEL);
            let pixel = &mut self.pixels[index];
            match pos % BYTES_PER_PIXEL {
                0 => pixel.r = byte,
                1 => pixel.g = byte,
                _ => pixel.b = byte,
            }
        }
        Ok(())
    }

    /// Position in the chain of row-major pixel `index`
    ///
    /// A trailing partial row that would map past the end keeps its
    /// row-major position.
    fn chain_index(&self, index: usize) -> usize {
        match self.serpentine_width {
            Some(width) => {
                let mapped = serpentine_index(index % width, index / width, width);
                if mapped < self.pixels.len() {
                    mapped
                } else {
                    index
                }
            }
            None => index,
        }
    }

    /// Push every segment to the driver, in segment order
    ///
    /// All segments are attempted even if one fails; the first error is
    /// returned.
    pub fn publish<D: DisplayDriver>(
        &self,
        segments: &SegmentMap,
        driver: &mut D,
    ) -> Result<(), DisplayError> {
        let mut result = Ok(());
        for segment in segments.segments() {
            let pixels = self.pixels.get(segment.range()).unwrap_or(&[]);
            let pushed = driver.push_segment(segment, pixels);
            if result.is_ok() {
                result = pushed;
            }
        }
        result
    }

    /// Snapshot of the first, middle and last pixel
    pub fn summary(&self) -> FrameSummary {
        let at = |i: usize| {
            let p = self.pixels.get(i).copied().unwrap_or_default();
            [p.r, p.g, p.b]
        };
        let len = self.pixels.len();
        FrameSummary {
            first: at(0),
            middle: at(len / 2),
            last: at(len.saturating_sub(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec as StdVec;

    /// Records every pushed segment
    struct RecordingDriver {
        pushed: StdVec<(u8, StdVec<RGB8>)>,
        fail_output: Option<u8>,
    }

    impl RecordingDriver {
        fn new() -> Self {
            Self {
                pushed: StdVec::new(),
                fail_output: None,
            }
        }
    }

    impl DisplayDriver for RecordingDriver {
        fn push_segment(
            &mut self,
            segment: &crate::pixels::Segment,
            pixels: &[RGB8],
        ) -> Result<(), DisplayError> {
            self.pushed.push((segment.output, pixels.to_vec()));
            if self.fail_output == Some(segment.output) {
                return Err(DisplayError::Transmit);
            }
            Ok(())
        }

        fn set_brightness(&mut self, _brightness: u8) {}
    }

    #[test]
    fn test_new_is_black() {
        let buffer = PixelBuffer::new(4);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.byte_capacity(), 12);
        assert!(buffer.pixels().iter().all(|p| *p == RGB8::default()));
    }

    #[test]
    fn test_capacity_clamped() {
        let buffer = PixelBuffer::new(MAX_PIXELS + 10);
        assert_eq!(buffer.capacity(), MAX_PIXELS);
    }

    #[test]
    fn test_apply_writes_triples() {
        let mut buffer = PixelBuffer::new(3);
        buffer.apply(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buffer.pixels()[0], RGB8::new(1, 2, 3));
        assert_eq!(buffer.pixels()[1], RGB8::new(4, 5, 6));
        assert_eq!(buffer.pixels()[2], RGB8::default());
    }

    #[test]
    fn test_apply_partial_triple() {
        let mut buffer = PixelBuffer::new(2);
        buffer.apply(&[9, 9, 9, 9, 9, 9]).unwrap();
        buffer.apply(&[1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.pixels()[0], RGB8::new(1, 2, 3));
        // Only the red channel of the second pixel changes
        assert_eq!(buffer.pixels()[1], RGB8::new(4, 9, 9));
    }

    #[test]
    fn test_apply_with_start_offset() {
        let mut buffer = PixelBuffer::new(3).with_start_offset(1);
        assert_eq!(buffer.start_offset(), 3);
        assert_eq!(buffer.payload_capacity(), 6);

        buffer.apply(&[1, 2, 3]).unwrap();
        assert_eq!(buffer.pixels()[0], RGB8::default());
        assert_eq!(buffer.pixels()[1], RGB8::new(1, 2, 3));
    }

    #[test]
    fn test_apply_out_of_range_writes_nothing() {
        let mut buffer = PixelBuffer::new(2).with_start_offset(1);
        assert_eq!(
            buffer.apply(&[1, 2, 3, 4]),
            Err(ApplyError::OutOfRange {
                offset: 3,
                len: 4,
                capacity: 6
            })
        );
        assert!(buffer.pixels().iter().all(|p| *p == RGB8::default()));
    }

    #[test]
    fn test_serpentine_reverses_odd_rows() {
        let mut buffer = PixelBuffer::new(6).with_serpentine(3);
        buffer
            .apply(&[1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6])
            .unwrap();

        let order: StdVec<u8> = buffer.pixels().iter().map(|p| p.r).collect();
        assert_eq!(order, [1, 2, 3, 6, 5, 4]);
    }

    #[test]
    fn test_serpentine_with_start_offset() {
        // Offset 4 lands on the middle of the reversed second row
        let mut buffer = PixelBuffer::new(6).with_serpentine(3).with_start_offset(4);
        buffer.apply(&[7, 8, 9]).unwrap();
        assert_eq!(buffer.pixels()[4], RGB8::new(7, 8, 9));

        buffer.apply(&[1, 1, 1, 2, 2, 2]).unwrap();
        assert_eq!(buffer.pixels()[4], RGB8::new(1, 1, 1));
        assert_eq!(buffer.pixels()[3], RGB8::new(2, 2, 2));
    }

    #[test]
    fn test_serpentine_partial_last_row() {
        // 5 pixels, 3 wide: the second row only has two pixels
        let mut buffer = PixelBuffer::new(5).with_serpentine(3);
        buffer
            .apply(&[1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5])
            .unwrap();
        let order: StdVec<u8> = buffer.pixels().iter().map(|p| p.r).collect();
        assert_eq!(order, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_serpentine_zero_width_is_row_major() {
        let buffer = PixelBuffer::new(4).with_serpentine(0);
        assert_eq!(buffer.serpentine_width(), None);
    }

    #[test]
    fn test_publish_serpentine_chain_order() {
        let segments = SegmentMap::from_counts(&[3, 3]).unwrap();
        let mut buffer = PixelBuffer::new(6).with_serpentine(3);
        buffer
            .apply(&[1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6])
            .unwrap();

        let mut driver = RecordingDriver::new();
        buffer.publish(&segments, &mut driver).unwrap();
        assert_eq!(
            driver.pushed[1].1,
            [RGB8::new(6, 6, 6), RGB8::new(5, 5, 5), RGB8::new(4, 4, 4)]
        );
    }

    #[test]
    fn test_publish_in_segment_order() {
        let segments = SegmentMap::from_counts(&[2, 1]).unwrap();
        let mut buffer = PixelBuffer::new(3);
        buffer.apply(&[1, 1, 1, 2, 2, 2, 3, 3, 3]).unwrap();

        let mut driver = RecordingDriver::new();
        buffer.publish(&segments, &mut driver).unwrap();

        assert_eq!(driver.pushed.len(), 2);
        assert_eq!(driver.pushed[0].0, 0);
        assert_eq!(
            driver.pushed[0].1,
            [RGB8::new(1, 1, 1), RGB8::new(2, 2, 2)]
        );
        assert_eq!(driver.pushed[1].0, 1);
        assert_eq!(driver.pushed[1].1, [RGB8::new(3, 3, 3)]);
    }

    #[test]
    fn test_publish_attempts_all_segments() {
        let segments = SegmentMap::from_counts(&[1, 1, 1]).unwrap();
        let buffer = PixelBuffer::new(3);

        let mut driver = RecordingDriver::new();
        driver.fail_output = Some(1);
        assert_eq!(
            buffer.publish(&segments, &mut driver),
            Err(DisplayError::Transmit)
        );
        assert_eq!(driver.pushed.len(), 3);
    }

    #[test]
    fn test_summary() {
        let mut buffer = PixelBuffer::new(5);
        buffer
            .apply(&[1, 1, 1, 0, 0, 0, 2, 2, 2, 0, 0, 0, 3, 3, 3])
            .unwrap();
        let summary = buffer.summary();
        assert_eq!(summary.first, [1, 1, 1]);
        assert_eq!(summary.middle, [2, 2, 2]);
        assert_eq!(summary.last, [3, 3, 3]);

        assert_eq!(PixelBuffer::new(0).summary(), FrameSummary::default());
    }
}
