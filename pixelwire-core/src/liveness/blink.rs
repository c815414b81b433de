//! Timed blink pattern

/// Startup indication: five 100 ms blinks
pub const STARTUP_BLINK: Blink = Blink::new(1000, 5);

/// Blink for a fixed duration at a fixed frequency
///
/// The LED starts on and toggles every half period (`500 / freq_hz` ms).
/// A frequency of 0 keeps it on for the whole duration. Once the duration
/// has elapsed the LED is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Blink {
    pub duration_ms: u32,
    pub freq_hz: u32,
}

impl Blink {
    /// Create a blink pattern
    pub const fn new(duration_ms: u32, freq_hz: u32) -> Self {
        Self {
            duration_ms,
            freq_hz,
        }
    }

    /// Solid on for `duration_ms`
    pub const fn solid(duration_ms: u32) -> Self {
        Self::new(duration_ms, 0)
    }

    /// Time between toggles, or `None` for a solid pattern
    pub fn half_period_ms(&self) -> Option<u32> {
        match self.freq_hz {
            0 => None,
            f => Some(500 / f).filter(|&half| half > 0),
        }
    }

    /// True once the pattern has run its course
    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= u64::from(self.duration_ms)
    }

    /// LED level `elapsed_ms` after the pattern started
    pub fn level_at(&self, elapsed_ms: u64) -> bool {
        if self.is_finished(elapsed_ms) {
            return false;
        }
        match self.half_period_ms() {
            None => true,
            Some(half) => (elapsed_ms / u64::from(half)) % 2 == 0,
        }
    }

    /// How long to wait before the level can next change
    pub fn step_ms(&self, elapsed_ms: u64) -> u32 {
        let left = u64::from(self.duration_ms).saturating_sub(elapsed_ms);
        let step = match self.half_period_ms() {
            None => left,
            Some(half) => {
                let half = u64::from(half);
                (half - elapsed_ms % half).min(left)
            }
        };
        step as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_blink() {
        let blink = STARTUP_BLINK;
        assert_eq!(blink.half_period_ms(), Some(100));

        // on, off, on, off... five times
        for i in 0..10u64 {
            assert_eq!(blink.level_at(i * 100), i % 2 == 0, "slot {}", i);
            assert_eq!(blink.level_at(i * 100 + 99), i % 2 == 0, "slot {} end", i);
        }
        assert!(!blink.level_at(1000));
        assert!(blink.is_finished(1000));
    }

    #[test]
    fn test_solid() {
        let blink = Blink::solid(500);
        assert_eq!(blink.half_period_ms(), None);
        assert!(blink.level_at(0));
        assert!(blink.level_at(499));
        assert!(!blink.level_at(500));
        assert_eq!(blink.step_ms(0), 500);
    }

    #[test]
    fn test_very_high_frequency_is_solid() {
        let blink = Blink::new(100, 1000);
        assert_eq!(blink.half_period_ms(), None);
        assert!(blink.level_at(50));
    }

    #[test]
    fn test_step_ms() {
        let blink = Blink::new(250, 5);
        assert_eq!(blink.step_ms(0), 100);
        assert_eq!(blink.step_ms(130), 70);
        // Last step is cut short by the duration
        assert_eq!(blink.step_ms(200), 50);
        assert_eq!(blink.step_ms(250), 0);
    }
}
