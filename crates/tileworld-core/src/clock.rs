//! Executor tick counter.
//!
//! The tick number is the only notion of time the executor reports. It
//! starts at 0 and advances once per executor cycle with checked arithmetic.

use std::time::Duration;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The tick interval must be non-zero.
    #[error("tick interval must be greater than zero")]
    ZeroInterval,
}

/// Tick counter paired with the fixed interval between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    /// Last completed tick (0 before the first cycle).
    tick: u64,

    /// Wall or virtual time between ticks.
    interval: Duration,
}

impl TickClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::ZeroInterval`] if `interval` is zero.
    pub const fn new(interval: Duration) -> Result<Self, ClockError> {
        if interval.is_zero() {
            return Err(ClockError::ZeroInterval);
        }
        Ok(Self { tick: 0, interval })
    }

    /// Create a clock from an interval in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::ZeroInterval`] if `millis` is zero.
    pub const fn from_millis(millis: u64) -> Result<Self, ClockError> {
        Self::new(Duration::from_millis(millis))
    }

    /// Advance by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Interval between ticks.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of whole ticks that fit in `total`.
    pub fn ticks_within(&self, total: Duration) -> u64 {
        total
            .as_nanos()
            .checked_div(self.interval.as_nanos())
            .and_then(|ticks| u64::try_from(ticks).ok())
            .unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        let clock = TickClock::from_millis(100).unwrap();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.interval(), Duration::from_millis(100));
    }

    #[test]
    fn clock_advances() {
        let mut clock = TickClock::from_millis(100).unwrap();
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn zero_interval_rejected() {
        assert_eq!(TickClock::from_millis(0), Err(ClockError::ZeroInterval));
    }

    #[test]
    fn ticks_within_rounds_down() {
        let clock = TickClock::from_millis(300).unwrap();
        assert_eq!(clock.ticks_within(Duration::from_millis(1000)), 3);
        assert_eq!(clock.ticks_within(Duration::from_millis(299)), 0);
    }
}
