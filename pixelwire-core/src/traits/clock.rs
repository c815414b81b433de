//! Monotonic time source

/// Millisecond clock injected into the poll loop
pub trait Clock {
    /// Milliseconds since an arbitrary fixed start point
    fn now_ms(&self) -> u64;
}
