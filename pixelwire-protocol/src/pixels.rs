//! Sender-side payload helpers
//!
//! Utilities for building payloads on the frame generator: stripping alpha
//! from rendered images, wiring-check marker frames and matrix remapping.

use crate::frame::{FrameError, BYTES_PER_PIXEL, MAX_PAYLOAD_SIZE};

/// Color used by [`marker_payload`] when lighting a single LED
pub const MARKER_COLOR: [u8; 3] = [0, 255, 0];

/// Strip the alpha channel from an RGBA image buffer
///
/// Writes `rgba.len() / 4 * 3` bytes to `out` and returns that count. A
/// trailing incomplete RGBA group is ignored.
pub fn rgba_to_rgb(rgba: &[u8], out: &mut [u8]) -> Result<usize, FrameError> {
    let pixels = rgba.len() / 4;
    let len = pixels * BYTES_PER_PIXEL;
    if len > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    if out.len() < len {
        return Err(FrameError::BufferTooSmall);
    }

    for (src, dst) in rgba.chunks_exact(4).zip(out.chunks_exact_mut(BYTES_PER_PIXEL)) {
        dst.copy_from_slice(&src[..BYTES_PER_PIXEL]);
    }
    Ok(len)
}

/// Build a payload that lights only LED `index`
///
/// Every LED before `index` is set to black. LEDs after it are not part of
/// the payload and keep whatever the sink last showed.
pub fn marker_payload(index: usize, color: [u8; 3], out: &mut [u8]) -> Result<usize, FrameError> {
    let len = (index + 1) * BYTES_PER_PIXEL;
    if len > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    if out.len() < len {
        return Err(FrameError::BufferTooSmall);
    }

    let marker = index * BYTES_PER_PIXEL;
    out[..marker].fill(0);
    out[marker..len].copy_from_slice(&color);
    Ok(len)
}

/// Map a row-major matrix coordinate onto a zig-zag wired chain
///
/// Even rows run left to right, odd rows right to left. A zero `width`
/// has no rows to reverse and maps every coordinate to `x`.
pub fn serpentine_index(x: usize, y: usize, width: usize) -> usize {
    if width == 0 {
        x
    } else if y % 2 == 0 {
        y * width + x
    } else {
        y * width + (width - 1 - x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_to_rgb_drops_alpha() {
        let rgba = [1, 2, 3, 255, 4, 5, 6, 0];
        let mut out = [0u8; 6];
        let len = rgba_to_rgb(&rgba, &mut out).unwrap();
        assert_eq!(len, 6);
        assert_eq!(out, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_rgba_to_rgb_ignores_partial_pixel() {
        let rgba = [9, 8, 7, 6, 5, 4];
        let mut out = [0u8; 6];
        assert_eq!(rgba_to_rgb(&rgba, &mut out), Ok(3));
        assert_eq!(&out[..3], &[9, 8, 7]);
    }

    #[test]
    fn test_rgba_to_rgb_buffer_too_small() {
        let rgba = [0u8; 8];
        let mut out = [0u8; 5];
        assert_eq!(rgba_to_rgb(&rgba, &mut out), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_marker_first_led() {
        let mut out = [0xEEu8; 8];
        assert_eq!(marker_payload(0, MARKER_COLOR, &mut out), Ok(3));
        assert_eq!(&out[..3], &[0, 255, 0]);
    }

    #[test]
    fn test_marker_pads_with_black() {
        let mut out = [0xEEu8; 12];
        let len = marker_payload(2, [1, 2, 3], &mut out).unwrap();
        assert_eq!(len, 9);
        assert_eq!(&out[..len], &[0, 0, 0, 0, 0, 0, 1, 2, 3]);
        // Bytes past the payload are untouched
        assert_eq!(&out[len..], &[0xEE; 3]);
    }

    #[test]
    fn test_marker_too_large() {
        let mut out = [0u8; 4];
        assert_eq!(
            marker_payload(crate::MAX_PIXELS, MARKER_COLOR, &mut out),
            Err(FrameError::PayloadTooLarge)
        );
        assert_eq!(
            marker_payload(1, MARKER_COLOR, &mut out),
            Err(FrameError::BufferTooSmall)
        );
    }

    #[test]
    fn test_serpentine() {
        // 4 wide: row 0 forward, row 1 reversed
        assert_eq!(serpentine_index(0, 0, 4), 0);
        assert_eq!(serpentine_index(3, 0, 4), 3);
        assert_eq!(serpentine_index(0, 1, 4), 7);
        assert_eq!(serpentine_index(3, 1, 4), 4);
        assert_eq!(serpentine_index(1, 2, 4), 9);
    }

    #[test]
    fn test_serpentine_zero_width() {
        assert_eq!(serpentine_index(0, 1, 0), 0);
        assert_eq!(serpentine_index(2, 3, 0), 2);
    }
}
