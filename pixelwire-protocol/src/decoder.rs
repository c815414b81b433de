//! Streaming frame decoder
//!
//! A byte-at-a-time state machine. All parsing context lives in the
//! [`FrameDecoder`] value, so a frame may be split across any number of
//! reads and the decoder picks up exactly where it stopped.

use heapless::Vec;

use crate::frame::{FrameError, MAGIC_1, MAGIC_2, MAX_PAYLOAD_SIZE};

/// Result of feeding bytes to the decoder
///
/// - `Ok(None)`: more bytes are needed
/// - `Ok(Some(payload))`: a frame was accepted
/// - `Err(e)`: a frame was rejected and the decoder resynchronized
pub type FeedResult<'a> = Result<Option<&'a [u8]>, FrameError>;

/// Decoder states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeState {
    /// Searching for MAGIC_1
    WaitMagic1,
    /// Got MAGIC_1, expecting MAGIC_2
    WaitMagic2,
    /// Expecting the low length byte
    WaitLength1,
    /// Expecting the high length byte
    WaitLength2,
    /// Reading payload bytes
    WaitData,
    /// Declared length exceeds capacity; swallowing bytes
    Discard,
    /// Expecting the checksum trailer
    WaitChecksum,
}

/// State machine for decoding incoming frames
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    /// Largest payload this decoder accepts, in bytes
    capacity: usize,
    expected_length: u16,
    received: usize,
    running_checksum: u8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(MAX_PAYLOAD_SIZE)
    }
}

impl FrameDecoder {
    /// Create a decoder accepting payloads of up to `capacity` bytes
    ///
    /// The capacity is clamped to [`MAX_PAYLOAD_SIZE`].
    pub fn new(capacity: usize) -> Self {
        Self {
            state: DecodeState::WaitMagic1,
            capacity: capacity.min(MAX_PAYLOAD_SIZE),
            expected_length: 0,
            received: 0,
            running_checksum: 0,
            payload: Vec::new(),
        }
    }

    /// Payload capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current state
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// True while searching for the start of a frame
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::WaitMagic1
    }

    /// Drop any partial frame and search for MAGIC_1 again
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitMagic1;
        self.expected_length = 0;
        self.received = 0;
        self.running_checksum = 0;
        self.payload.clear();
    }

    /// Feed a single byte to the decoder
    ///
    /// The returned payload borrows the decoder and stays valid until the
    /// next call.
    pub fn feed(&mut self, byte: u8) -> FeedResult<'_> {
        if self.step(byte)? {
            Ok(Some(self.payload.as_slice()))
        } else {
            Ok(None)
        }
    }

    /// Feed bytes until the first accepted or rejected frame
    ///
    /// Returns how many bytes were consumed. Bytes after a terminal event are
    /// left for the caller to feed again.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, FeedResult<'_>) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.step(byte) {
                Ok(false) => {}
                Ok(true) => return (i + 1, Ok(Some(self.payload.as_slice()))),
                Err(e) => return (i + 1, Err(e)),
            }
        }
        (bytes.len(), Ok(None))
    }

    /// Advance by one byte; `Ok(true)` means a frame was accepted
    fn step(&mut self, byte: u8) -> Result<bool, FrameError> {
        match self.state {
            DecodeState::WaitMagic1 => {
                if byte == MAGIC_1 {
                    self.state = DecodeState::WaitMagic2;
                }
                // Noise between frames is ignored
                Ok(false)
            }
            DecodeState::WaitMagic2 => {
                if byte == MAGIC_2 {
                    self.state = DecodeState::WaitLength1;
                    Ok(false)
                } else {
                    // The mismatching byte is not re-tested as MAGIC_1
                    self.state = DecodeState::WaitMagic1;
                    Err(FrameError::Resync)
                }
            }
            DecodeState::WaitLength1 => {
                self.expected_length = byte as u16;
                self.state = DecodeState::WaitLength2;
                Ok(false)
            }
            DecodeState::WaitLength2 => {
                self.expected_length |= (byte as u16) << 8;
                self.received = 0;
                self.running_checksum = 0;
                self.payload.clear();

                let declared = self.expected_length as usize;
                if declared > self.capacity {
                    if self.capacity == 0 {
                        return Err(self.overflow());
                    }
                    self.state = DecodeState::Discard;
                } else if declared == 0 {
                    self.state = DecodeState::WaitChecksum;
                } else {
                    self.state = DecodeState::WaitData;
                }
                Ok(false)
            }
            DecodeState::WaitData => {
                // Cannot fail: expected_length <= capacity <= MAX_PAYLOAD_SIZE
                if self.payload.push(byte).is_err() {
                    return Err(self.overflow());
                }
                self.running_checksum = self.running_checksum.wrapping_add(byte);
                self.received += 1;
                if self.received == self.expected_length as usize {
                    self.state = DecodeState::WaitChecksum;
                }
                Ok(false)
            }
            DecodeState::Discard => {
                self.received += 1;
                if self.received >= self.capacity {
                    return Err(self.overflow());
                }
                Ok(false)
            }
            DecodeState::WaitChecksum => {
                let expected = self.running_checksum;
                self.state = DecodeState::WaitMagic1;
                if byte == expected {
                    Ok(true)
                } else {
                    self.payload.clear();
                    Err(FrameError::Checksum {
                        expected,
                        received: byte,
                    })
                }
            }
        }
    }

    fn overflow(&mut self) -> FrameError {
        let err = FrameError::Overflow {
            declared: self.expected_length,
            capacity: self.capacity,
        };
        self.reset();
        err
    }
}
