//! Timer engine
//!
//! Owns the timers, their reset buttons, the software clock and the
//! alert scheduler. [`TimerEngine::step`] runs one loop iteration in a
//! fixed order:
//!
//! 1. Advance the clock
//! 2. Poll buttons (short press mutes, long press resets)
//! 3. Route day, hour and minute ticks to matching timers
//! 4. Re-render overdue timers on a flash phase edge
//! 5. Evaluate the buzzer
//!
//! Port failures never stop the loop; they are counted in the returned
//! [`StepOutcome`] for the caller to log.

use heapless::Vec;
use upkeep_protocol::MAX_REPORT_SIZE;

use crate::alert::AlertScheduler;
use crate::clock::{ClockMultiplexer, ClockTicks};
use crate::config::{BuzzerConfig, SystemConfig, TimeUnit};
use crate::input::{DebouncedInput, PressEvent};
use crate::timer::{Effect, Effects, MaintenanceTimer, TimerState};
use crate::traits::{Indicator, NetworkError, Reporter, TimerStore, ToneOutput};

pub use crate::config::MAX_TIMERS;

/// Seconds between flash phase changes
pub const FLASH_PERIOD_S: u32 = 30;

/// Borrowed port implementations for one call
pub struct Ports<'a, S, I, R, T> {
    pub store: &'a mut S,
    pub indicator: &'a mut I,
    pub reporter: &'a mut R,
    pub tone: &'a mut T,
}

/// Result of [`TimerEngine::boot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootOutcome {
    /// Timers restored from storage
    pub loaded: u8,
    /// Timers with nothing saved, started from zero
    pub defaulted: u8,
    /// Timers whose saved state could not be read, started from zero
    pub load_failures: u8,
    /// Failed writes of default state (clear-saved mode)
    pub persist_failures: u8,
}

/// Result of one [`TimerEngine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepOutcome {
    pub ticks: ClockTicks,
    /// A short press muted the alert
    pub muted: bool,
    /// Bit `i` set when timer `i` was reset by its button
    pub resets: u8,
    pub persist_failures: u8,
    pub report_failures: u8,
    /// Result of an even-hour reconnect request
    pub reconnect: Option<Result<(), NetworkError>>,
    /// Buzzer should sound
    pub buzzer_on: bool,
    /// The tone output was switched this step
    pub tone_changed: bool,
}

impl StepOutcome {
    /// Nothing worth logging happened
    pub fn is_quiet(&self) -> bool {
        !self.ticks.minute
            && !self.muted
            && self.resets == 0
            && self.persist_failures == 0
            && self.report_failures == 0
            && self.reconnect.is_none()
            && !self.tone_changed
    }
}

/// The maintenance timer controller
pub struct TimerEngine {
    timers: Vec<MaintenanceTimer, MAX_TIMERS>,
    inputs: Vec<DebouncedInput, MAX_TIMERS>,
    clock: ClockMultiplexer,
    alert: AlertScheduler,
    buzzer: BuzzerConfig,
    clear_saved: bool,
    /// Shared flash phase of all overdue timers
    flash_on: bool,
    /// Tone last sent to the buzzer
    tone: Option<u16>,
}

impl TimerEngine {
    /// Build timers and buttons from configuration
    ///
    /// Timers start from zero; call [`boot`](Self::boot) to restore
    /// saved progress.
    pub fn new(config: &SystemConfig, now_ms: u32) -> Self {
        let mut timers = Vec::new();
        let mut inputs = Vec::new();
        for timer in config.timers.iter() {
            // Both vectors share the capacity of config.timers
            let _ = timers.push(MaintenanceTimer::new(timer.clone(), None));
            let _ = inputs.push(DebouncedInput::new(
                timer.button.active_high(),
                &config.input,
            ));
        }

        Self {
            timers,
            inputs,
            clock: ClockMultiplexer::new(now_ms),
            alert: AlertScheduler::new(&config.buzzer),
            buzzer: config.buzzer,
            clear_saved: config.clear_saved,
            flash_on: false,
            tone: None,
        }
    }

    /// Restore saved progress and draw every indicator
    ///
    /// In clear-saved mode stored progress is ignored and the zero state
    /// is written over it.
    pub fn boot<S, I, R, T>(&mut self, ports: &mut Ports<'_, S, I, R, T>) -> BootOutcome
    where
        S: TimerStore,
        I: Indicator,
        R: Reporter,
        T: ToneOutput,
    {
        let mut outcome = BootOutcome::default();

        for timer in self.timers.iter_mut() {
            let slot = timer.config().slot;

            if self.clear_saved {
                if ports.store.save(slot, &TimerState::default()).is_err() {
                    outcome.persist_failures = outcome.persist_failures.saturating_add(1);
                }
                outcome.defaulted += 1;
            } else {
                match ports.store.load(slot) {
                    Ok(Some(state)) => {
                        *timer = MaintenanceTimer::new(timer.config().clone(), Some(state));
                        outcome.loaded += 1;
                    }
                    Ok(None) => outcome.defaulted += 1,
                    Err(_) => outcome.load_failures += 1,
                }
            }

            let frame = timer.frame();
            ports
                .indicator
                .render(frame.channel, frame.color, frame.total, frame.lit);
        }

        ports.tone.set_tone(None);
        self.tone = None;

        outcome
    }

    /// Run one loop iteration
    ///
    /// # Arguments
    /// * `now_ms` - monotonic millisecond counter, may wrap
    /// * `levels` - raw button levels in timer order
    /// * `ports` - side effect sinks
    pub fn step<S, I, R, T>(
        &mut self,
        now_ms: u32,
        levels: &[bool],
        ports: &mut Ports<'_, S, I, R, T>,
    ) -> StepOutcome
    where
        S: TimerStore,
        I: Indicator,
        R: Reporter,
        T: ToneOutput,
    {
        let ticks = self.clock.poll(now_ms);
        let mut outcome = StepOutcome {
            ticks,
            ..StepOutcome::default()
        };

        for (i, &level) in levels.iter().enumerate().take(self.inputs.len()) {
            match self.inputs[i].poll(level, now_ms) {
                PressEvent::None => {}
                PressEvent::Short => {
                    self.alert.mute();
                    outcome.muted = true;
                }
                PressEvent::Long => {
                    let effects = self.timers[i].reset();
                    outcome.resets |= 1u8 << i;
                    dispatch(effects, ports, &mut outcome);
                }
            }
        }

        let second = self.clock.second();
        let flash_edge = ticks.second && second % FLASH_PERIOD_S == 0;
        if flash_edge {
            self.flash_on = !self.flash_on;
        }

        let mut ticked = 0u8;

        if ticks.day {
            self.alert.clear_mute();
            ticked |= self.route(TimeUnit::Days, ports, &mut outcome);
        }

        if ticks.hour {
            ticked |= self.route(TimeUnit::Hours, ports, &mut outcome);
            if self.clock.hour() % 2 == 0 && !ports.reporter.is_link_up() {
                outcome.reconnect = Some(ports.reporter.reconnect());
            }
        }

        if ticks.minute {
            ticked |= self.route(TimeUnit::Minutes, ports, &mut outcome);
        }

        if flash_edge {
            for (i, timer) in self.timers.iter_mut().enumerate() {
                if ticked & (1u8 << i) != 0 {
                    continue;
                }
                if let Some(frame) = timer.flash(self.flash_on) {
                    ports
                        .indicator
                        .render(frame.channel, frame.color, frame.total, frame.lit);
                }
            }
        }

        let aggregate_overdue = self.timers.iter().any(|t| t.is_overdue());
        outcome.buzzer_on = self.alert.evaluate(now_ms, second, aggregate_overdue);

        let tone = if outcome.buzzer_on {
            Some(self.alert_tone())
        } else {
            None
        };
        if tone != self.tone {
            ports.tone.set_tone(tone);
            self.tone = tone;
            outcome.tone_changed = true;
        }

        outcome
    }

    /// Tick every timer counting `unit`, returning the mask of ticked timers
    fn route<S, I, R, T>(
        &mut self,
        unit: TimeUnit,
        ports: &mut Ports<'_, S, I, R, T>,
        outcome: &mut StepOutcome,
    ) -> u8
    where
        S: TimerStore,
        I: Indicator,
        R: Reporter,
        T: ToneOutput,
    {
        let second = self.clock.second();
        let mut ticked = 0u8;

        for (i, timer) in self.timers.iter_mut().enumerate() {
            let effects = timer.tick(timer.matches_unit(unit), second, self.flash_on);
            if !effects.is_empty() {
                ticked |= 1u8 << i;
            }
            dispatch(effects, ports, outcome);
        }

        ticked
    }

    /// Frequency of the current alert
    ///
    /// With `per_timer_tone` the first overdue timer's tone wins.
    pub fn alert_tone(&self) -> u16 {
        if self.buzzer.per_timer_tone {
            if let Some(timer) = self.timers.iter().find(|t| t.is_overdue()) {
                return timer.config().tone_hz;
            }
        }
        self.buzzer.tone_hz
    }

    pub fn timers(&self) -> &[MaintenanceTimer] {
        &self.timers
    }

    pub fn clock(&self) -> &ClockMultiplexer {
        &self.clock
    }

    pub fn alert(&self) -> &AlertScheduler {
        &self.alert
    }

    pub fn is_muted(&self) -> bool {
        self.alert.is_muted()
    }

    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    pub fn any_overdue(&self) -> bool {
        self.timers.iter().any(|t| t.is_overdue())
    }
}

/// Perform timer effects in order, counting failures
fn dispatch<S, I, R, T>(effects: Effects, ports: &mut Ports<'_, S, I, R, T>, outcome: &mut StepOutcome)
where
    S: TimerStore,
    I: Indicator,
    R: Reporter,
    T: ToneOutput,
{
    for effect in effects {
        match effect {
            Effect::Persist { slot, state } => {
                if ports.store.save(slot, &state).is_err() {
                    outcome.persist_failures = outcome.persist_failures.saturating_add(1);
                }
            }
            Effect::Render(frame) => {
                ports
                    .indicator
                    .render(frame.channel, frame.color, frame.total, frame.lit);
            }
            Effect::Report(report) => {
                let mut buf = [0u8; MAX_REPORT_SIZE];
                let sent = match report.encode(&mut buf) {
                    Ok(bytes) => ports.reporter.send(bytes),
                    Err(e) => Err(NetworkError::from(e)),
                };
                if sent.is_err() {
                    outcome.report_failures = outcome.report_failures.saturating_add(1);
                }
            }
        }
    }
}
