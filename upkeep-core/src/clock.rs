//! Software clock
//!
//! There is no RTC on the board. Time is derived from a free-running
//! millisecond counter that may wrap, so every comparison goes through
//! `wrapping_sub`.

/// Milliseconds per second tick
pub const MS_PER_SECOND: u32 = 1000;

/// Seconds per minute tick
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Seconds per hour tick
pub const SECONDS_PER_HOUR: u32 = 3600;

/// Hours per day tick
pub const HOURS_PER_DAY: u32 = 24;

/// Tick events produced by one call to [`ClockMultiplexer::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTicks {
    pub second: bool,
    pub minute: bool,
    pub hour: bool,
    pub day: bool,
}

impl ClockTicks {
    /// True if no tick fired
    pub fn is_empty(&self) -> bool {
        !(self.second || self.minute || self.hour || self.day)
    }
}

/// Converts a monotonic millisecond reading into second/minute/hour/day ticks
///
/// At most one second is emitted per poll. When the caller falls behind,
/// `last_fire_ms` advances by exactly one second per poll so the backlog is
/// worked off without drift.
#[derive(Debug, Clone)]
pub struct ClockMultiplexer {
    last_fire_ms: u32,
    /// Seconds into the current hour (0..3600)
    seconds: u32,
    /// Hours into the current day (0..24)
    hours: u32,
    /// Day rollovers since boot
    days: u32,
}

impl ClockMultiplexer {
    /// Create a clock whose first second ends 1000 ms after `now_ms`
    pub const fn new(now_ms: u32) -> Self {
        Self {
            last_fire_ms: now_ms,
            seconds: 0,
            hours: 0,
            days: 0,
        }
    }

    /// Advance the clock to `now_ms`
    pub fn poll(&mut self, now_ms: u32) -> ClockTicks {
        let mut ticks = ClockTicks::default();

        if now_ms.wrapping_sub(self.last_fire_ms) < MS_PER_SECOND {
            return ticks;
        }

        self.last_fire_ms = self.last_fire_ms.wrapping_add(MS_PER_SECOND);
        ticks.second = true;
        self.seconds += 1;

        if self.seconds % SECONDS_PER_MINUTE == 0 {
            ticks.minute = true;
        }

        if self.seconds >= SECONDS_PER_HOUR {
            self.seconds = 0;
            self.hours += 1;
            ticks.hour = true;

            if self.hours >= HOURS_PER_DAY {
                self.hours = 0;
                self.days = self.days.wrapping_add(1);
                ticks.day = true;
            }
        }

        ticks
    }

    /// Seconds elapsed in the current hour
    pub fn second(&self) -> u32 {
        self.seconds
    }

    /// Hours elapsed in the current day
    pub fn hour(&self) -> u32 {
        self.hours
    }

    /// Day rollovers since boot
    pub fn day(&self) -> u32 {
        self.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Poll once per simulated second starting at `start`
    fn run_seconds(clock: &mut ClockMultiplexer, start: u32, seconds: u32) -> (u32, u32, u32) {
        let (mut minutes, mut hours, mut days) = (0, 0, 0);
        for s in 1..=seconds {
            let t = clock.poll(start.wrapping_add(s * MS_PER_SECOND));
            assert!(t.second);
            minutes += t.minute as u32;
            hours += t.hour as u32;
            days += t.day as u32;
        }
        (minutes, hours, days)
    }

    #[test]
    fn test_no_tick_before_one_second() {
        let mut clock = ClockMultiplexer::new(0);
        assert!(clock.poll(0).is_empty());
        assert!(clock.poll(999).is_empty());
        assert!(clock.poll(1000).second);
        assert_eq!(clock.second(), 1);
    }

    #[test]
    fn test_fire_does_not_reset_to_now() {
        let mut clock = ClockMultiplexer::new(0);
        // Late poll: the next second is still due at 2000, not 2500
        assert!(clock.poll(1500).second);
        assert!(clock.poll(1999).is_empty());
        assert!(clock.poll(2000).second);
    }

    #[test]
    fn test_backlog_drains_one_second_per_poll() {
        let mut clock = ClockMultiplexer::new(0);
        let mut fired = 0;
        for _ in 0..10 {
            if clock.poll(5_000).second {
                fired += 1;
            }
        }
        assert_eq!(fired, 5);
        assert_eq!(clock.second(), 5);
    }

    #[test]
    fn test_minute_ticks_every_sixty_seconds() {
        let mut clock = ClockMultiplexer::new(0);
        let (minutes, hours, _) = run_seconds(&mut clock, 0, 180);
        assert_eq!(minutes, 3);
        assert_eq!(hours, 0);
    }

    #[test]
    fn test_hour_and_second_rollover() {
        let mut clock = ClockMultiplexer::new(0);
        let (minutes, hours, days) = run_seconds(&mut clock, 0, SECONDS_PER_HOUR);
        assert_eq!(minutes, 60);
        assert_eq!(hours, 1);
        assert_eq!(days, 0);
        assert_eq!(clock.second(), 0);
        assert_eq!(clock.hour(), 1);
    }

    #[test]
    fn test_day_tick_after_24_hours() {
        let mut clock = ClockMultiplexer::new(0);
        let (_, hours, days) = run_seconds(&mut clock, 0, SECONDS_PER_HOUR * HOURS_PER_DAY);
        assert_eq!(hours, 24);
        assert_eq!(days, 1);
        assert_eq!(clock.hour(), 0);
        assert_eq!(clock.day(), 1);
    }

    #[test]
    fn test_counter_wraparound() {
        let start = u32::MAX - 500;
        let mut clock = ClockMultiplexer::new(start);
        assert!(clock.poll(u32::MAX).is_empty());
        // start + 1000 wraps to 499
        assert!(clock.poll(499).second);
        assert!(clock.poll(1000).is_empty());
        assert!(clock.poll(1499).second);
        assert_eq!(clock.second(), 2);
    }

    proptest! {
        #[test]
        fn prop_seconds_match_elapsed_time(start in any::<u32>(), steps in proptest::collection::vec(1u32..700, 1..200)) {
            let mut clock = ClockMultiplexer::new(start);
            let mut elapsed = 0u32;
            let mut fired = 0u32;
            for step in steps {
                elapsed += step;
                if clock.poll(start.wrapping_add(elapsed)).second {
                    fired += 1;
                }
            }
            // Steps are shorter than a second, so the clock never lags
            prop_assert_eq!(fired, elapsed / MS_PER_SECOND);
        }
    }
}
