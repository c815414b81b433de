//! LED output drivers

pub mod strip;

pub use strip::StripBank;
