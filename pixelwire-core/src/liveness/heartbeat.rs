//! Periodic heartbeat

use crate::config::HeartbeatConfig;
use crate::traits::LivenessSignal;

/// Wall-clock duty cycle for the status LED
///
/// The signal is on for the first `on_ms` of every `period_ms`. It runs off
/// the clock alone and does not care about frame traffic.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    period_ms: u32,
    on_ms: u32,
    /// Last level written to the signal
    level: Option<bool>,
}

impl Heartbeat {
    /// Create a heartbeat; a period of 0 keeps the signal off
    pub const fn new(period_ms: u32, on_ms: u32) -> Self {
        Self {
            period_ms,
            on_ms,
            level: None,
        }
    }

    /// Create a heartbeat from configuration
    pub fn from_config(config: &HeartbeatConfig) -> Self {
        Self::new(config.period_ms, config.on_ms)
    }

    /// Level the signal should have at `now_ms`
    pub fn is_active(&self, now_ms: u64) -> bool {
        if self.period_ms == 0 {
            return false;
        }
        now_ms % u64::from(self.period_ms) < u64::from(self.on_ms)
    }

    /// Drive the signal for `now_ms`
    ///
    /// The signal is only written when the level changes. Returns the new
    /// level when it did.
    pub fn update<L: LivenessSignal>(&mut self, now_ms: u64, signal: &mut L) -> Option<bool> {
        let level = self.is_active(now_ms);
        if self.level == Some(level) {
            return None;
        }
        signal.set(level);
        self.level = Some(level);
        Some(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    struct Recorder(Vec<bool>);

    impl LivenessSignal for Recorder {
        fn set(&mut self, active: bool) {
            self.0.push(active);
        }
    }

    #[test]
    fn test_duty_cycle() {
        let hb = Heartbeat::new(1000, 100);
        assert!(hb.is_active(0));
        assert!(hb.is_active(99));
        assert!(!hb.is_active(100));
        assert!(!hb.is_active(999));
        assert!(hb.is_active(1000));
        assert!(hb.is_active(5050));
    }

    #[test]
    fn test_zero_period_is_off() {
        let hb = Heartbeat::new(0, 100);
        assert!(!hb.is_active(0));
        assert!(!hb.is_active(12345));
    }

    #[test]
    fn test_only_writes_on_change() {
        let mut hb = Heartbeat::new(1000, 100);
        let mut led = Recorder(Vec::new());

        assert_eq!(hb.update(0, &mut led), Some(true));
        assert_eq!(hb.update(50, &mut led), None);
        assert_eq!(hb.update(150, &mut led), Some(false));
        assert_eq!(hb.update(900, &mut led), None);
        assert_eq!(hb.update(1010, &mut led), Some(true));

        assert_eq!(led.0, [true, false, true]);
    }
}
