//! Alert buzzer scheduling
//!
//! While any timer is overdue the buzzer sounds short pulses separated by
//! a minimum gap. A short button press mutes the alert until the next
//! day rollover.

use crate::config::BuzzerConfig;

/// Buzzer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertPhase {
    /// Buzzer off
    Idle,
    /// Buzzer on since `pulse_start_ms`
    Pulsing,
}

/// Non-blocking pulse scheduler
#[derive(Debug, Clone)]
pub struct AlertScheduler {
    enabled: bool,
    muted: bool,
    phase: AlertPhase,
    pulse_start_ms: u32,
    /// Second (within the hour) the last pulse started
    last_fired_second: u32,
    gap_s: u32,
    length_ms: u32,
}

impl AlertScheduler {
    pub fn new(config: &BuzzerConfig) -> Self {
        Self {
            enabled: config.enabled,
            muted: false,
            phase: AlertPhase::Idle,
            pulse_start_ms: 0,
            last_fired_second: 0,
            gap_s: config.gap_s,
            length_ms: config.length_ms,
        }
    }

    /// Decide whether the buzzer should sound now
    ///
    /// Muting, disabling or clearing the overdue condition silences an
    /// active pulse on the next call.
    pub fn evaluate(&mut self, now_ms: u32, current_second: u32, aggregate_overdue: bool) -> bool {
        if !self.enabled || self.muted || !aggregate_overdue {
            self.phase = AlertPhase::Idle;
            return false;
        }

        match self.phase {
            AlertPhase::Pulsing => {
                if now_ms.wrapping_sub(self.pulse_start_ms) > self.length_ms {
                    self.phase = AlertPhase::Idle;
                    false
                } else {
                    true
                }
            }
            AlertPhase::Idle => {
                if current_second < self.last_fired_second {
                    // Second counter rolled over at the hour
                    self.last_fired_second = current_second;
                    false
                } else if current_second - self.last_fired_second > self.gap_s {
                    self.phase = AlertPhase::Pulsing;
                    self.pulse_start_ms = now_ms;
                    self.last_fired_second = current_second;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Silence alerts until [`clear_mute`](Self::clear_mute)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Called on day rollover
    pub fn clear_mute(&mut self) {
        self.muted = false;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn phase(&self) -> AlertPhase {
        self.phase
    }
}
