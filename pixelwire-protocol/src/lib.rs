//! Pixelwire Serial Frame Protocol
//!
//! This crate defines the byte stream that a host (the frame generator) sends
//! to the LED sink over a plain serial link. There is no flow control and no
//! acknowledgement; the sink locks onto frames by their magic bytes and drops
//! anything that fails validation.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌─────────┬─────────┬────────────┬──────────────┬──────────┐
//! │ MAGIC_1 │ MAGIC_2 │ LENGTH     │ PAYLOAD      │ CHECKSUM │
//! │ 0xFF    │ 0xAA    │ 2B (LE)    │ 0–LENGTH B   │ 1B       │
//! └─────────┴─────────┴────────────┴──────────────┴──────────┘
//! ```
//!
//! The payload is raw RGB data, three bytes per LED. The checksum is the sum
//! of all payload bytes, truncated to 8 bits.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod decoder;
pub mod frame;
pub mod pixels;

pub use decoder::{DecodeState, FeedResult, FrameDecoder};
pub use pixels::{marker_payload, rgba_to_rgb, serpentine_index, MARKER_COLOR};
pub use frame::{
    checksum, encode_frame, encode_to_vec, FrameError, FrameHeader, BYTES_PER_PIXEL, MAGIC_1,
    MAGIC_2, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, MAX_PIXELS,
};
