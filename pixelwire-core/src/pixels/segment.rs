//! Output segment table

use core::ops::Range;

use heapless::Vec;
use pixelwire_protocol::MAX_PIXELS;

/// Maximum number of LED outputs
pub const MAX_OUTPUTS: usize = 8;

/// Contiguous run of pixels bound to one physical output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Index of the first pixel in the buffer
    pub offset: usize,
    /// Number of pixels
    pub count: usize,
    /// Output (data line) index
    pub output: u8,
}

impl Segment {
    /// Create a segment descriptor
    pub const fn new(offset: usize, count: usize, output: u8) -> Self {
        Self {
            offset,
            count,
            output,
        }
    }

    /// One past the last pixel index
    pub const fn end(&self) -> usize {
        self.offset + self.count
    }

    /// Buffer index range covered by this segment
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Segment table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentError {
    /// No segments given
    Empty,
    /// More than [`MAX_OUTPUTS`] segments
    TooManySegments,
    /// Segment with zero pixels
    EmptySegment { output: u8 },
    /// Segment does not start where the previous one ended
    Gap { output: u8 },
    /// Segment starts before the previous one ended
    Overlap { output: u8 },
    /// Total pixels exceed [`MAX_PIXELS`]
    TooManyPixels { total: usize },
}

/// Table partitioning the pixel buffer across outputs
///
/// Segments tile `[0, capacity)` in order, with no gaps or overlaps. The
/// table is built once at start-up and never changes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentMap {
    segments: Vec<Segment, MAX_OUTPUTS>,
    capacity: usize,
}

impl SegmentMap {
    /// Build the tiling from per-output LED counts
    ///
    /// Output `i` gets the `i`-th run of `counts[i]` pixels.
    pub fn from_counts(counts: &[u16]) -> Result<Self, SegmentError> {
        if counts.len() > MAX_OUTPUTS {
            return Err(SegmentError::TooManySegments);
        }

        let mut segments: Vec<Segment, MAX_OUTPUTS> = Vec::new();
        let mut offset = 0;
        for (output, &count) in counts.iter().enumerate() {
            let segment = Segment::new(offset, count as usize, output as u8);
            offset = segment.end();
            // Cannot fail: length checked above
            segments
                .push(segment)
                .map_err(|_| SegmentError::TooManySegments)?;
        }

        Self::from_segments(&segments)
    }

    /// Build a map from explicit descriptors, checking the tiling
    pub fn from_segments(segments: &[Segment]) -> Result<Self, SegmentError> {
        let segments =
            Vec::from_slice(segments).map_err(|_| SegmentError::TooManySegments)?;
        let capacity = segments.last().map(Segment::end).unwrap_or(0);
        let map = Self { segments, capacity };
        map.validate()?;
        Ok(map)
    }

    /// Check that the segments tile the buffer exactly
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.segments.is_empty() {
            return Err(SegmentError::Empty);
        }

        let mut expected = 0;
        for segment in &self.segments {
            if segment.count == 0 {
                return Err(SegmentError::EmptySegment {
                    output: segment.output,
                });
            }
            if segment.offset > expected {
                return Err(SegmentError::Gap {
                    output: segment.output,
                });
            }
            if segment.offset < expected {
                return Err(SegmentError::Overlap {
                    output: segment.output,
                });
            }
            expected = segment.end();
        }

        if expected > MAX_PIXELS {
            return Err(SegmentError::TooManyPixels { total: expected });
        }
        Ok(())
    }

    /// Segments in buffer order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total pixels covered
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of outputs
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if the map has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Find the segment holding buffer pixel `index`
    ///
    /// Returns the segment and the index within it.
    pub fn locate(&self, index: usize) -> Option<(&Segment, usize)> {
        self.segments
            .iter()
            .find(|s| s.range().contains(&index))
            .map(|s| (s, index - s.offset))
    }
}
