//! Configuration types
//!
//! Board-agnostic configuration structures and the text format they are
//! read from.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
