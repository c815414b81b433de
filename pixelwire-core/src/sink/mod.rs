//! Cooperative sink loop
//!
//! [`Sink::tick`] is the whole runtime: pull bytes from the source, advance
//! the decoder, copy accepted payloads into the pixel buffer and keep the
//! status LED ticking. It never waits for input. When the source runs dry
//! the decoder keeps its place and the next tick resumes from there.

use pixelwire_protocol::{DecodeState, FrameDecoder, FrameError};

use crate::config::{ConfigError, Layout, SinkConfig};
use crate::liveness::Heartbeat;
use crate::pixels::{ApplyError, FrameSummary, PixelBuffer, SegmentError, SegmentMap};
use crate::traits::{ByteSource, Clock, DisplayDriver, DisplayError, LivenessSignal};

/// Something worth reporting happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkEvent {
    /// A frame was accepted and copied into the buffer
    Accepted {
        /// Payload length in bytes
        length: usize,
        /// Running count of accepted frames
        frame: u32,
    },
    /// A frame was rejected; the buffer is unchanged
    Rejected(FrameError),
    /// An accepted payload did not fit after the start offset
    OutOfRange(ApplyError),
    /// A partial frame stalled and was dropped
    IdleTimeout,
}

/// Result of one [`Sink::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// Bytes taken from the source
    pub consumed: usize,
    /// At most one terminal event per tick
    pub event: Option<SinkEvent>,
}

/// Errors building a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Configuration failed validation
    Config(ConfigError),
    /// Output counts do not form a valid segment table
    Segment(SegmentError),
}

impl From<ConfigError> for SinkError {
    fn from(e: ConfigError) -> Self {
        SinkError::Config(e)
    }
}

impl From<SegmentError> for SinkError {
    fn from(e: SegmentError) -> Self {
        SinkError::Segment(e)
    }
}

/// Frame decoder, pixel buffer and liveness state for one sink
#[derive(Debug, Clone)]
pub struct Sink {
    decoder: FrameDecoder,
    buffer: PixelBuffer,
    segments: SegmentMap,
    heartbeat: Heartbeat,
    /// 0 disables the idle timeout
    idle_timeout_ms: u32,
    /// Clock reading of the tick that last consumed a byte
    last_byte_ms: u64,
    frames: u32,
}

impl Sink {
    /// Create a sink for `segments`, writing payloads from pixel `start_offset`
    ///
    /// The decoder accepts exactly as many bytes as fit after the offset.
    /// Heartbeat and idle timeout start disabled.
    pub fn new(segments: SegmentMap, start_offset: usize) -> Self {
        let buffer = PixelBuffer::new(segments.capacity()).with_start_offset(start_offset);
        Self {
            decoder: FrameDecoder::new(buffer.payload_capacity()),
            buffer,
            segments,
            heartbeat: Heartbeat::new(0, 0),
            idle_timeout_ms: 0,
            last_byte_ms: 0,
            frames: 0,
        }
    }

    /// Drive the liveness signal with `heartbeat`
    pub fn with_heartbeat(mut self, heartbeat: Heartbeat) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Drop partial frames that stall for `timeout_ms`
    pub fn with_idle_timeout(mut self, timeout_ms: u32) -> Self {
        self.idle_timeout_ms = timeout_ms;
        self
    }

    /// Reverse odd rows of a matrix `width` pixels wide
    pub fn with_serpentine(mut self, width: usize) -> Self {
        self.buffer = self.buffer.with_serpentine(width);
        self
    }

    /// Build a sink from a validated configuration
    pub fn from_config(config: &SinkConfig) -> Result<Self, SinkError> {
        config.validate()?;
        let segments = SegmentMap::from_counts(&config.led_counts())?;
        let mut sink = Self::new(segments, config.start_offset as usize)
            .with_heartbeat(Heartbeat::from_config(&config.heartbeat))
            .with_idle_timeout(config.idle_timeout_ms);
        if let Some(matrix) = &config.matrix {
            if matrix.layout == Layout::Serpentine {
                sink = sink.with_serpentine(matrix.width as usize);
            }
        }
        Ok(sink)
    }

    /// Run one pass of the poll loop
    ///
    /// Consumes bytes until the source is empty or a frame is accepted or
    /// rejected. Bytes after that event stay in the source for the next
    /// tick, so the caller can publish between frames.
    pub fn tick<S, C, L>(&mut self, source: &mut S, clock: &C, liveness: &mut L) -> TickOutcome
    where
        S: ByteSource,
        C: Clock,
        L: LivenessSignal,
    {
        let now = clock.now_ms();
        self.heartbeat.update(now, liveness);

        if source.available() == 0 {
            return TickOutcome {
                consumed: 0,
                event: self.check_idle(now),
            };
        }

        let mut consumed = 0;
        while let Some(byte) = source.read() {
            consumed += 1;
            self.last_byte_ms = now;

            let event = match self.decoder.feed(byte) {
                Ok(None) => continue,
                Ok(Some(payload)) => match self.buffer.apply(payload) {
                    Ok(()) => {
                        self.frames = self.frames.wrapping_add(1);
                        SinkEvent::Accepted {
                            length: payload.len(),
                            frame: self.frames,
                        }
                    }
                    Err(e) => SinkEvent::OutOfRange(e),
                },
                Err(e) => SinkEvent::Rejected(e),
            };

            return TickOutcome {
                consumed,
                event: Some(event),
            };
        }

        TickOutcome {
            consumed,
            event: None,
        }
    }

    /// Reset a decoder that has been parked mid-frame for too long
    fn check_idle(&mut self, now: u64) -> Option<SinkEvent> {
        if self.idle_timeout_ms == 0 || self.decoder.is_idle() {
            return None;
        }
        if now.saturating_sub(self.last_byte_ms) < u64::from(self.idle_timeout_ms) {
            return None;
        }
        self.decoder.reset();
        Some(SinkEvent::IdleTimeout)
    }

    /// Push the buffer to the outputs
    pub fn publish<D: DisplayDriver>(&self, driver: &mut D) -> Result<(), DisplayError> {
        self.buffer.publish(&self.segments, driver)
    }

    /// Current pixel buffer
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Output segment table
    pub fn segments(&self) -> &SegmentMap {
        &self.segments
    }

    /// Decoder state, for diagnostics
    pub fn decoder_state(&self) -> DecodeState {
        self.decoder.state()
    }

    /// Largest payload the decoder accepts, in bytes
    pub fn payload_capacity(&self) -> usize {
        self.decoder.capacity()
    }

    /// Frames accepted so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// First, middle and last pixel of the buffer
    pub fn summary(&self) -> FrameSummary {
        self.buffer.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::Segment;
    use crate::traits::SliceSource;
    use crate::RGB8;
    use pixelwire_protocol::encode_to_vec;
    use proptest::prelude::*;
    use std::vec::Vec;

    const WORKED_EXAMPLE: [u8; 8] = [0xFF, 0xAA, 0x03, 0x00, 0x10, 0x20, 0x30, 0x60];

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    #[derive(Default)]
    struct MockLed {
        writes: Vec<bool>,
    }

    impl LivenessSignal for MockLed {
        fn set(&mut self, active: bool) {
            self.writes.push(active);
        }
    }

    #[derive(Default)]
    struct RecordingDriver {
        pushed: Vec<(Segment, Vec<RGB8>)>,
    }

    impl DisplayDriver for RecordingDriver {
        fn push_segment(&mut self, segment: &Segment, pixels: &[RGB8]) -> Result<(), DisplayError> {
            self.pushed.push((*segment, pixels.to_vec()));
            Ok(())
        }

        fn set_brightness(&mut self, _brightness: u8) {}
    }

    fn make_sink(counts: &[u16]) -> Sink {
        Sink::new(SegmentMap::from_counts(counts).unwrap(), 0)
    }

    #[test]
    fn test_accepts_worked_example() {
        let mut sink = make_sink(&[4]);
        let mut source = SliceSource::new(&WORKED_EXAMPLE);
        let mut led = MockLed::default();

        let outcome = sink.tick(&mut source, &FixedClock(0), &mut led);
        assert_eq!(outcome.consumed, 8);
        assert_eq!(
            outcome.event,
            Some(SinkEvent::Accepted {
                length: 3,
                frame: 1
            })
        );
        assert_eq!(sink.buffer().pixels()[0], RGB8::new(0x10, 0x20, 0x30));
        assert_eq!(sink.frames(), 1);
        assert_eq!(sink.decoder_state(), DecodeState::WaitMagic1);
    }

    #[test]
    fn test_checksum_failure_leaves_buffer() {
        let mut sink = make_sink(&[4]);
        let mut bytes = WORKED_EXAMPLE;
        bytes[7] = 0x61;
        let mut source = SliceSource::new(&bytes);

        let outcome = sink.tick(&mut source, &FixedClock(0), &mut MockLed::default());
        assert_eq!(
            outcome.event,
            Some(SinkEvent::Rejected(FrameError::Checksum {
                expected: 0x60,
                received: 0x61
            }))
        );
        assert!(sink.buffer().pixels().iter().all(|p| *p == RGB8::default()));
        assert_eq!(sink.frames(), 0);
    }

    #[test]
    fn test_one_frame_per_tick() {
        let mut sink = make_sink(&[4]);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&WORKED_EXAMPLE);
        bytes.extend_from_slice(&encode_to_vec(&[1, 2, 3]).unwrap());
        let mut source = SliceSource::new(&bytes);
        let mut led = MockLed::default();

        let first = sink.tick(&mut source, &FixedClock(0), &mut led);
        assert_eq!(first.consumed, 8);
        assert_eq!(source.remaining().len(), 8);
        assert_eq!(sink.buffer().pixels()[0], RGB8::new(0x10, 0x20, 0x30));

        let second = sink.tick(&mut source, &FixedClock(1), &mut led);
        assert_eq!(
            second.event,
            Some(SinkEvent::Accepted {
                length: 3,
                frame: 2
            })
        );
        assert_eq!(sink.buffer().pixels()[0], RGB8::new(1, 2, 3));
        assert!(source.is_empty());
    }

    #[test]
    fn test_resumes_across_ticks() {
        let mut sink = make_sink(&[4]);
        let mut led = MockLed::default();

        let mut source = SliceSource::new(&WORKED_EXAMPLE[..5]);
        let outcome = sink.tick(&mut source, &FixedClock(0), &mut led);
        assert_eq!(outcome, TickOutcome { consumed: 5, event: None });
        assert_eq!(sink.decoder_state(), DecodeState::WaitData);

        let mut source = SliceSource::new(&WORKED_EXAMPLE[5..]);
        let outcome = sink.tick(&mut source, &FixedClock(10), &mut led);
        assert!(matches!(outcome.event, Some(SinkEvent::Accepted { .. })));
    }

    #[test]
    fn test_overflow_contained() {
        // Two pixels: 6 byte capacity
        let mut sink = make_sink(&[2]);
        assert_eq!(sink.payload_capacity(), 6);

        let frame = encode_to_vec(&[0xEE; 9]).unwrap();
        let mut source = SliceSource::new(&frame);
        let outcome = sink.tick(&mut source, &FixedClock(0), &mut MockLed::default());

        assert_eq!(outcome.consumed, 4 + 6);
        assert_eq!(
            outcome.event,
            Some(SinkEvent::Rejected(FrameError::Overflow {
                declared: 9,
                capacity: 6
            }))
        );
        assert!(sink.buffer().pixels().iter().all(|p| *p == RGB8::default()));
        assert_eq!(sink.decoder_state(), DecodeState::WaitMagic1);
    }

    #[test]
    fn test_start_offset() {
        let mut sink = Sink::new(SegmentMap::from_counts(&[3]).unwrap(), 1);
        assert_eq!(sink.payload_capacity(), 6);

        let mut source = SliceSource::new(&WORKED_EXAMPLE);
        sink.tick(&mut source, &FixedClock(0), &mut MockLed::default());
        assert_eq!(sink.buffer().pixels()[0], RGB8::default());
        assert_eq!(sink.buffer().pixels()[1], RGB8::new(0x10, 0x20, 0x30));
    }

    #[test]
    fn test_idle_timeout_resets_partial_frame() {
        let mut sink = make_sink(&[4]).with_idle_timeout(100);
        let mut led = MockLed::default();

        let mut source = SliceSource::new(&WORKED_EXAMPLE[..4]);
        sink.tick(&mut source, &FixedClock(1000), &mut led);
        assert_eq!(sink.decoder_state(), DecodeState::WaitData);

        let mut empty = SliceSource::new(&[]);
        let outcome = sink.tick(&mut empty, &FixedClock(1099), &mut led);
        assert_eq!(outcome.event, None);
        assert_eq!(sink.decoder_state(), DecodeState::WaitData);

        let outcome = sink.tick(&mut empty, &FixedClock(1100), &mut led);
        assert_eq!(outcome.event, Some(SinkEvent::IdleTimeout));
        assert_eq!(sink.decoder_state(), DecodeState::WaitMagic1);

        // Only reported once
        let outcome = sink.tick(&mut empty, &FixedClock(5000), &mut led);
        assert_eq!(outcome.event, None);
    }

    #[test]
    fn test_idle_timeout_disabled() {
        let mut sink = make_sink(&[4]);
        let mut led = MockLed::default();

        let mut source = SliceSource::new(&WORKED_EXAMPLE[..4]);
        sink.tick(&mut source, &FixedClock(0), &mut led);

        let mut empty = SliceSource::new(&[]);
        let outcome = sink.tick(&mut empty, &FixedClock(1_000_000), &mut led);
        assert_eq!(outcome.event, None);
        assert_eq!(sink.decoder_state(), DecodeState::WaitData);
    }

    #[test]
    fn test_heartbeat_runs_without_traffic() {
        let mut sink = make_sink(&[4]).with_heartbeat(Heartbeat::new(1000, 100));
        let mut led = MockLed::default();
        let mut empty = SliceSource::new(&[]);

        for now in [0, 50, 100, 500, 1000, 1100] {
            sink.tick(&mut empty, &FixedClock(now), &mut led);
        }
        assert_eq!(led.writes, [true, false, true, false]);
    }

    #[test]
    fn test_from_config() {
        let config = SinkConfig::default();
        let sink = Sink::from_config(&config).unwrap();
        assert_eq!(sink.segments().len(), 3);
        assert_eq!(sink.buffer().capacity(), 1911);
        assert_eq!(sink.payload_capacity(), 5733);

        let mut bad = SinkConfig::default();
        bad.outputs.clear();
        assert_eq!(
            Sink::from_config(&bad).unwrap_err(),
            SinkError::Config(ConfigError::NoOutputs)
        );
    }

    #[test]
    fn test_from_config_serpentine_layout() {
        let mut config = SinkConfig::default();
        let row_major = Sink::from_config(&config).unwrap();
        assert_eq!(row_major.buffer().serpentine_width(), None);

        if let Some(matrix) = config.matrix.as_mut() {
            matrix.layout = Layout::Serpentine;
        }
        let mut sink = Sink::from_config(&config).unwrap();
        assert_eq!(sink.buffer().serpentine_width(), Some(49));

        // Second row of the 49 wide matrix: its first pixel is wired last
        let mut payload = std::vec![0u8; 50 * 3];
        payload[49 * 3..].copy_from_slice(&[1, 2, 3]);
        let frame = encode_to_vec(&payload).unwrap();
        let mut source = SliceSource::new(&frame);
        sink.tick(&mut source, &FixedClock(0), &mut MockLed::default());
        assert_eq!(sink.buffer().pixels()[97], RGB8::new(1, 2, 3));
        assert_eq!(sink.buffer().pixels()[49], RGB8::default());
    }

    #[test]
    fn test_publish_after_accept() {
        let mut sink = make_sink(&[1, 1]);
        let frame = encode_to_vec(&[1, 2, 3, 4, 5, 6]).unwrap();
        let mut source = SliceSource::new(&frame);
        sink.tick(&mut source, &FixedClock(0), &mut MockLed::default());

        let mut driver = RecordingDriver::default();
        sink.publish(&mut driver).unwrap();
        assert_eq!(driver.pushed.len(), 2);
        assert_eq!(driver.pushed[0].0.output, 0);
        assert_eq!(driver.pushed[0].1, [RGB8::new(1, 2, 3)]);
        assert_eq!(driver.pushed[1].0.output, 1);
        assert_eq!(driver.pushed[1].1, [RGB8::new(4, 5, 6)]);
    }

    #[test]
    fn test_noise_then_frame() {
        let mut sink = make_sink(&[4]);
        let mut bytes = std::vec![0x00, 0x42, 0xAA];
        bytes.extend_from_slice(&WORKED_EXAMPLE);
        let mut source = SliceSource::new(&bytes);

        let outcome = sink.tick(&mut source, &FixedClock(0), &mut MockLed::default());
        assert_eq!(outcome.consumed, bytes.len());
        assert!(matches!(outcome.event, Some(SinkEvent::Accepted { .. })));
    }

    proptest! {
        #[test]
        fn prop_chunked_stream_shows_last_frame(
            payloads in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..=30),
                1..4,
            ),
            chunk in 1usize..16,
        ) {
            let mut stream = Vec::new();
            for payload in &payloads {
                stream.extend_from_slice(&encode_to_vec(payload).unwrap());
            }

            let mut sink = make_sink(&[10]);
            let mut led = MockLed::default();
            let mut accepted = 0;
            for piece in stream.chunks(chunk) {
                let mut source = SliceSource::new(piece);
                while !source.is_empty() {
                    let outcome = sink.tick(&mut source, &FixedClock(0), &mut led);
                    match outcome.event {
                        Some(SinkEvent::Accepted { .. }) => accepted += 1,
                        None => {}
                        other => prop_assert!(false, "unexpected event {:?}", other),
                    }
                }
            }
            prop_assert_eq!(accepted, payloads.len());

            // The first bytes of the buffer hold the last payload
            let last = payloads.last().unwrap();
            let flat: Vec<u8> = sink
                .buffer()
                .pixels()
                .iter()
                .flat_map(|p| [p.r, p.g, p.b])
                .collect();
            prop_assert_eq!(&flat[..last.len()], last.as_slice());
        }
    }
}
