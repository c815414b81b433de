//! Collaborator traits
//!
//! These traits define the interface between the sink logic and the
//! hardware-specific implementations around it.

pub mod clock;
pub mod display;
pub mod liveness;
pub mod source;

pub use clock::Clock;
pub use display::{DisplayDriver, DisplayError};
pub use liveness::LivenessSignal;
pub use source::{ByteSource, SliceSource};
