//! Maintenance timer
//!
//! One timer counts units (minutes, hours or days) since its last reset.
//! Operations never touch hardware; they return the side effects the
//! caller must perform, in order.

use heapless::Vec;
use upkeep_protocol::TimerReport;

use crate::config::{Color, TimeUnit, TimerConfig, PIXELS_PER_UNIT_SCALE};

/// Progress saved across power loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerState {
    /// Units counted since the last reset
    pub current: u32,
    /// Sticky until reset
    pub overdue: bool,
}

/// One indicator refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorFrame {
    pub channel: u8,
    pub color: Color,
    pub total: u16,
    pub lit: u16,
}

/// Side effect requested by a timer operation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Save progress under the timer's slot
    Persist { slot: u8, state: TimerState },
    /// Refresh the timer's strip
    Render(IndicatorFrame),
    /// Send a snapshot to the remote listener
    Report(TimerReport),
}

/// Effects of one operation (at most four: render, persist, flash, report)
pub type Effects = Vec<Effect, 4>;

/// A single maintenance interval
#[derive(Debug, Clone)]
pub struct MaintenanceTimer {
    config: TimerConfig,
    state: TimerState,
    /// Flash phase last rendered
    alert_toggle: bool,
}

impl MaintenanceTimer {
    /// Build a timer from its configuration and saved progress
    ///
    /// `None` starts from zero. A saved count above the period is marked
    /// overdue even if the stored flag disagrees.
    pub fn new(config: TimerConfig, saved: Option<TimerState>) -> Self {
        let mut state = saved.unwrap_or_default();
        state.overdue |= state.current > config.period;
        Self {
            config,
            state,
            alert_toggle: false,
        }
    }

    /// Advance by one unit
    ///
    /// # Arguments
    /// * `unit_matches` - the tick belongs to this timer's unit
    /// * `current_second` - second within the hour of the tick
    /// * `flash_on` - shared flash phase
    pub fn tick(&mut self, unit_matches: bool, current_second: u32, flash_on: bool) -> Effects {
        let mut effects = Effects::new();
        if !self.config.enabled || !unit_matches {
            return effects;
        }

        self.state.current = self.state.current.saturating_add(1);
        if self.state.current > self.config.period {
            self.state.overdue = true;
        }

        push(&mut effects, Effect::Render(self.progress_frame()));
        push(&mut effects, self.persist());

        if self.state.overdue && current_second % 30 == 0 {
            if let Some(frame) = self.flash(flash_on) {
                push(&mut effects, Effect::Render(frame));
            }
        }

        push(&mut effects, Effect::Report(self.snapshot()));
        effects
    }

    /// Zero the count and clear overdue
    ///
    /// Allowed while disabled. Repeating it yields the same state and effects.
    pub fn reset(&mut self) -> Effects {
        self.state = TimerState::default();
        self.alert_toggle = false;

        let mut effects = Effects::new();
        push(&mut effects, self.persist());
        push(&mut effects, Effect::Render(self.progress_frame()));
        push(&mut effects, Effect::Report(self.snapshot()));
        effects
    }

    /// Render the given flash phase
    ///
    /// Returns `None` unless overdue. The on phase fills the strip in the
    /// alert colour, the off phase shows normal progress.
    pub fn flash(&mut self, flash_on: bool) -> Option<IndicatorFrame> {
        if !self.state.overdue {
            return None;
        }
        self.alert_toggle = flash_on;
        Some(self.frame())
    }

    /// What the strip should currently show
    pub fn frame(&self) -> IndicatorFrame {
        if self.state.overdue && self.alert_toggle {
            IndicatorFrame {
                channel: self.config.channel,
                color: self.config.alert_color,
                total: self.config.pixels_total,
                lit: self.config.pixels_total,
            }
        } else {
            self.progress_frame()
        }
    }

    /// Progress in the normal colour
    pub fn progress_frame(&self) -> IndicatorFrame {
        IndicatorFrame {
            channel: self.config.channel,
            color: self.config.normal_color,
            total: self.config.pixels_total,
            lit: self.progress_lit(),
        }
    }

    /// `min(pixels_total, floor(current * pixels_per_unit))`
    pub fn progress_lit(&self) -> u16 {
        let lit = self.state.current as u64 * self.config.pixels_per_unit_scaled as u64
            / PIXELS_PER_UNIT_SCALE as u64;
        lit.min(self.config.pixels_total as u64) as u16
    }

    pub fn snapshot(&self) -> TimerReport {
        TimerReport {
            name: self.config.name.clone(),
            overdue: self.state.overdue,
            current: self.state.current,
            period: self.config.period,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.state.overdue
    }

    pub fn matches_unit(&self, unit: TimeUnit) -> bool {
        self.config.unit == unit
    }

    pub fn alert_toggle(&self) -> bool {
        self.alert_toggle
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    fn persist(&self) -> Effect {
        Effect::Persist {
            slot: self.config.slot,
            state: self.state,
        }
    }
}

fn push(effects: &mut Effects, effect: Effect) {
    let pushed = effects.push(effect);
    debug_assert!(pushed.is_ok(), "Effects capacity below the longest operation");
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;
    use proptest::prelude::*;

    fn lens_config() -> TimerConfig {
        TimerConfig {
            name: String::try_from("LASER LENS CLEAN").unwrap(),
            unit: TimeUnit::Days,
            period: 12,
            pixels_total: 12,
            pixels_per_unit_scaled: PIXELS_PER_UNIT_SCALE,
            ..TimerConfig::default()
        }
    }

    fn renders(effects: &Effects) -> impl Iterator<Item = &IndicatorFrame> {
        effects.iter().filter_map(|e| match e {
            Effect::Render(frame) => Some(frame),
            _ => None,
        })
    }

    #[test]
    fn test_tick_effect_order() {
        let mut timer = MaintenanceTimer::new(lens_config(), None);
        let effects = timer.tick(true, 0, false);

        assert_eq!(effects.len(), 3);
        assert!(matches!(effects[0], Effect::Render(_)));
        assert_eq!(
            effects[1],
            Effect::Persist {
                slot: 0,
                state: TimerState {
                    current: 1,
                    overdue: false
                }
            }
        );
        match &effects[2] {
            Effect::Report(report) => {
                assert_eq!(report.name.as_str(), "LASER LENS CLEAN");
                assert_eq!(report.current, 1);
                assert_eq!(report.period, 12);
                assert!(!report.overdue);
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_tick_ignored_when_disabled_or_unit_mismatch() {
        let mut timer = MaintenanceTimer::new(lens_config(), None);
        assert!(timer.tick(false, 0, false).is_empty());
        assert_eq!(timer.state().current, 0);

        let mut config = lens_config();
        config.enabled = false;
        let mut disabled = MaintenanceTimer::new(config, None);
        assert!(disabled.tick(true, 0, false).is_empty());
        assert_eq!(disabled.state().current, 0);
    }

    #[test]
    fn test_overdue_after_period() {
        let mut timer = MaintenanceTimer::new(lens_config(), None);
        for _ in 0..12 {
            timer.tick(true, 0, false);
        }
        assert!(!timer.is_overdue());

        timer.tick(true, 0, false);
        assert!(timer.is_overdue());
        assert_eq!(timer.state().current, 13);
        assert_eq!(timer.progress_lit(), 12);
    }

    #[test]
    fn test_overdue_tick_renders_flash_phase() {
        let mut timer = MaintenanceTimer::new(
            lens_config(),
            Some(TimerState {
                current: 12,
                overdue: false,
            }),
        );

        let effects = timer.tick(true, 30, true);
        assert_eq!(effects.len(), 4);
        let frames: std::vec::Vec<_> = renders(&effects).collect();
        assert_eq!(frames[0].color, Color::RED);
        assert_eq!(frames[1].color, Color::BLUE);
        assert_eq!(frames[1].lit, 12);
        assert!(timer.alert_toggle());

        // Off phase shows normal progress
        let effects = timer.tick(true, 0, false);
        let last = renders(&effects).last().copied().unwrap();
        assert_eq!(last.color, Color::RED);
        assert!(!timer.alert_toggle());

        // No flash render away from the 30 s boundary
        let effects = timer.tick(true, 17, true);
        assert_eq!(renders(&effects).count(), 1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut timer = MaintenanceTimer::new(
            lens_config(),
            Some(TimerState {
                current: 20,
                overdue: true,
            }),
        );
        timer.flash(true);

        let first = timer.reset();
        assert_eq!(*timer.state(), TimerState::default());
        assert!(!timer.alert_toggle());
        assert_eq!(timer.frame().lit, 0);

        let second = timer.reset();
        assert_eq!(first, second);
        assert_eq!(*timer.state(), TimerState::default());
    }

    #[test]
    fn test_reset_allowed_when_disabled() {
        let mut config = lens_config();
        config.enabled = false;
        let mut timer = MaintenanceTimer::new(
            config,
            Some(TimerState {
                current: 5,
                overdue: false,
            }),
        );
        let effects = timer.reset();
        assert_eq!(effects.len(), 3);
        assert_eq!(timer.state().current, 0);
    }

    #[test]
    fn test_loaded_overdue_is_normalized() {
        let timer = MaintenanceTimer::new(
            lens_config(),
            Some(TimerState {
                current: 13,
                overdue: false,
            }),
        );
        assert!(timer.is_overdue());
    }

    #[test]
    fn test_fractional_pixels_per_unit() {
        let mut config = lens_config();
        config.pixels_per_unit_scaled = 5_000;
        let timer = MaintenanceTimer::new(
            config,
            Some(TimerState {
                current: 7,
                overdue: false,
            }),
        );
        assert_eq!(timer.progress_lit(), 3);
    }

    #[test]
    fn test_eighth_pixel_per_unit_fills_at_period() {
        let mut config = lens_config();
        config.period = 96;
        config.pixels_total = 12;
        config.pixels_per_unit_scaled = 1_250;

        let timer = MaintenanceTimer::new(
            config.clone(),
            Some(TimerState {
                current: 96,
                overdue: false,
            }),
        );
        assert_eq!(timer.progress_lit(), 12);

        let timer = MaintenanceTimer::new(
            config,
            Some(TimerState {
                current: 95,
                overdue: false,
            }),
        );
        assert_eq!(timer.progress_lit(), 11);
    }

    #[test]
    fn test_flash_requires_overdue() {
        let mut timer = MaintenanceTimer::new(lens_config(), None);
        assert_eq!(timer.flash(true), None);
        assert!(!timer.alert_toggle());
    }

    #[test]
    fn test_matches_unit() {
        let timer = MaintenanceTimer::new(lens_config(), None);
        assert!(timer.matches_unit(TimeUnit::Days));
        assert!(!timer.matches_unit(TimeUnit::Hours));
        assert!(!timer.matches_unit(TimeUnit::Minutes));
    }

    proptest! {
        #[test]
        fn prop_tick_counts_and_overdue(period in 0u32..50, ticks in 0u32..120) {
            let mut config = lens_config();
            config.period = period;
            let mut timer = MaintenanceTimer::new(config, None);

            for n in 1..=ticks {
                timer.tick(true, 0, false);
                prop_assert_eq!(timer.state().current, n);
                prop_assert_eq!(timer.is_overdue(), n > period);
            }
        }

        #[test]
        fn prop_lit_count_clamped(current in any::<u32>(), ppu in 0u32..1_000_000, total in 0u16..300) {
            let mut config = lens_config();
            config.pixels_per_unit_scaled = ppu;
            config.pixels_total = total;
            let timer = MaintenanceTimer::new(config, Some(TimerState { current, overdue: false }));

            let expected = (current as u64 * ppu as u64 / PIXELS_PER_UNIT_SCALE as u64)
                .min(total as u64) as u16;
            prop_assert_eq!(timer.progress_lit(), expected);
            prop_assert!(timer.frame().lit <= total);
        }
    }
}
