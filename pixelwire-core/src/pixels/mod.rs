//! Pixel storage
//!
//! A single [`PixelBuffer`] receives every accepted payload. The
//! [`SegmentMap`] splits it into contiguous ranges, one per LED output.

pub mod buffer;
pub mod segment;

pub use buffer::{ApplyError, FrameSummary, PixelBuffer};
pub use segment::{Segment, SegmentError, SegmentMap, MAX_OUTPUTS};
