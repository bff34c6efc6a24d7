//! PWM buzzer
//!
//! The buzzer is driven with a 50% square wave. Frequency is set through
//! the slice's clock divider (8.4 fixed point) and TOP register:
//! f = SYS_CLK / (divider * (top + 1))

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::types::U12F4;
use upkeep_core::ToneOutput;

use crate::pio::SYS_CLK_HZ;

/// Smallest divider (1.0) in sixteenths
const MIN_DIVIDER_X16: u32 = 16;
/// Largest divider (255 + 15/16) in sixteenths
const MAX_DIVIDER_X16: u32 = 0xFFF;

/// Divider (in sixteenths) and TOP for a tone
///
/// Picks the smallest divider whose TOP fits 16 bits, for the finest
/// frequency resolution. Returns `None` for 0 Hz or tones too low for
/// the largest divider.
pub fn calc_tone_config(tone_hz: u16) -> Option<(u16, u16)> {
    if tone_hz == 0 {
        return None;
    }

    let clk_x16 = SYS_CLK_HZ as u64 * 16;
    let per_divider = tone_hz as u64 * 65_536;
    let divider_x16 = clk_x16.div_ceil(per_divider).max(MIN_DIVIDER_X16 as u64);
    if divider_x16 > MAX_DIVIDER_X16 as u64 {
        return None;
    }

    let period = clk_x16 / (tone_hz as u64 * divider_x16);
    let top = period.saturating_sub(1).min(u16::MAX as u64);

    Some((divider_x16 as u16, top as u16))
}

/// Buzzer on one PWM channel A
pub struct PwmTone<'d> {
    pwm: Pwm<'d>,
    config: PwmConfig,
    current: Option<u16>,
}

impl<'d> PwmTone<'d> {
    /// Wrap a PWM output, starting silent
    pub fn new(mut pwm: Pwm<'d>) -> Self {
        let mut config = PwmConfig::default();
        config.compare_a = 0;
        pwm.set_config(&config);

        Self {
            pwm,
            config,
            current: None,
        }
    }

    /// Currently sounding tone
    pub fn current(&self) -> Option<u16> {
        self.current
    }
}

impl ToneOutput for PwmTone<'_> {
    fn set_tone(&mut self, tone_hz: Option<u16>) {
        if tone_hz == self.current {
            return;
        }

        match tone_hz.and_then(calc_tone_config) {
            Some((divider_x16, top)) => {
                self.config.divider = U12F4::from_bits(divider_x16);
                self.config.top = top;
                self.config.compare_a = top / 2;
            }
            None => {
                self.config.compare_a = 0;
            }
        }

        self.pwm.set_config(&self.config);
        self.current = tone_hz;
    }
}
