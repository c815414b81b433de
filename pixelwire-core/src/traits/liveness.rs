//! Liveness indicator trait

/// An on/off indicator showing the sink is running
///
/// Usually a status LED. Implementations should be cheap to call; the sink
/// only calls `set` when the level changes.
pub trait LivenessSignal {
    /// Turn the indicator on or off
    fn set(&mut self, active: bool);
}
