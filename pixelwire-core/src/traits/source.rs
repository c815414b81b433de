//! Byte source trait

/// Sequential, destructive source of incoming bytes
///
/// There is no peeking: once a byte has been read it is gone.
pub trait ByteSource {
    /// Number of bytes that can be read without waiting
    fn available(&self) -> usize;

    /// Take the next byte, or `None` if nothing is buffered
    fn read(&mut self) -> Option<u8>;
}

/// Byte source over a received slice
///
/// The firmware fills a buffer from the UART and wraps it in a `SliceSource`;
/// bytes the sink did not consume stay available for the next tick.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Wrap a byte slice
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Number of bytes read so far
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// True once every byte has been read
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

impl ByteSource for SliceSource<'_> {
    fn available(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }
}
