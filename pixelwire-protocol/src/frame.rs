//! Frame layout, checksum and encoding.
//!
//! Frame format:
//! - MAGIC_1 (1 byte): 0xFF
//! - MAGIC_2 (1 byte): 0xAA
//! - LENGTH (2 bytes): payload length, low byte first
//! - PAYLOAD (LENGTH bytes): RGB triples
//! - CHECKSUM (1 byte): sum of all PAYLOAD bytes modulo 256

use heapless::Vec;

/// First frame synchronization byte
pub const MAGIC_1: u8 = 0xFF;

/// Second frame synchronization byte
pub const MAGIC_2: u8 = 0xAA;

/// MAGIC_1 + MAGIC_2 + LENGTH
pub const HEADER_SIZE: usize = 4;

/// Trailing checksum byte
pub const CHECKSUM_SIZE: usize = 1;

/// Bytes per LED on the wire (R, G, B)
pub const BYTES_PER_PIXEL: usize = 3;

/// Largest LED count a sink can be configured for
pub const MAX_PIXELS: usize = 2048;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_PIXELS * BYTES_PER_PIXEL;

/// Maximum complete frame size (HEADER + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE + CHECKSUM_SIZE;

/// Errors that can occur during frame decoding or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// MAGIC_1 was not followed by MAGIC_2
    Resync,
    /// Declared length does not fit the receive capacity
    Overflow {
        /// Length field from the header
        declared: u16,
        /// Capacity of the decoder in bytes
        capacity: usize,
    },
    /// Trailer byte does not match the payload sum
    Checksum {
        /// Sum computed over the received payload
        expected: u8,
        /// Trailer byte actually received
        received: u8,
    },
    /// Payload exceeds what a frame can carry
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Calculate the checksum of a payload
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Payload length in bytes
    pub length: u16,
}

impl FrameHeader {
    /// Create a header for a payload of `length` bytes
    pub const fn new(length: u16) -> Self {
        Self { length }
    }

    /// Encode the header into its 4 wire bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [lo, hi] = self.length.to_le_bytes();
        [MAGIC_1, MAGIC_2, lo, hi]
    }

    /// Parse a header from 4 wire bytes
    pub fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Result<Self, FrameError> {
        if bytes[0] != MAGIC_1 || bytes[1] != MAGIC_2 {
            return Err(FrameError::Resync);
        }
        Ok(Self {
            length: u16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }

    /// Total wire size of a frame with this header
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.length as usize + CHECKSUM_SIZE
    }
}

/// Encode a payload into a complete frame
///
/// Returns the number of bytes written
pub fn encode_frame(payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    let length = u16::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge)?;
    let header = FrameHeader::new(length);
    let frame_len = header.frame_len();
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    buffer[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);
    buffer[frame_len - 1] = checksum(payload);

    Ok(frame_len)
}

/// Encode a payload into a heapless Vec
pub fn encode_to_vec(payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }

    let mut frame = Vec::new();
    frame
        .resize(FrameHeader::new(payload.len() as u16).frame_len(), 0)
        .map_err(|_| FrameError::BufferTooSmall)?;
    let len = encode_frame(payload, &mut frame)?;
    frame.truncate(len);
    Ok(frame)
}
