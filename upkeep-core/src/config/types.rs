//! Configuration type definitions
//!
//! Configuration is supplied at boot and never persisted. Changing a
//! timer's period or unit therefore requires the `clear_saved` option so
//! stale progress from flash is discarded.

use heapless::{String, Vec};

use super::hardware::PinConfig;

/// Maximum timer name length
pub const MAX_NAME_LEN: usize = upkeep_protocol::MAX_NAME_LEN;

/// Maximum timers per config
pub const MAX_TIMERS: usize = 8;

/// Fixed-point scale of `pixels_per_unit` (four decimal places)
pub const PIXELS_PER_UNIT_SCALE: u32 = 10_000;

/// Decimal places representable at [`PIXELS_PER_UNIT_SCALE`]
pub const PIXELS_PER_UNIT_DECIMALS: usize = 4;

/// Unit counted by a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeUnit {
    Minutes,
    Hours,
    #[default]
    Days,
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `brightness / 255`
    pub const fn scaled(self, brightness: u8) -> Self {
        const fn scale(c: u8, k: u8) -> u8 {
            ((c as u16 * k as u16) / 255) as u8
        }
        Self {
            r: scale(self.r, brightness),
            g: scale(self.g, brightness),
            b: scale(self.b, brightness),
        }
    }
}

/// One maintenance interval
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Flash slot holding this timer's progress
    pub slot: u8,
    /// Display name, also sent in reports
    pub name: String<MAX_NAME_LEN>,
    /// Tick stream that advances this timer
    pub unit: TimeUnit,
    /// Disabled timers ignore ticks but still render and accept resets
    pub enabled: bool,
    /// Units allowed before the timer is overdue
    pub period: u32,
    /// LEDs on this timer's strip
    pub pixels_total: u16,
    /// LEDs lit per counted unit, scaled by [`PIXELS_PER_UNIT_SCALE`]
    pub pixels_per_unit_scaled: u32,
    pub normal_color: Color,
    pub alert_color: Color,
    /// Buzzer frequency when this timer drives the alert
    pub tone_hz: u16,
    /// Indicator channel (strip index)
    pub channel: u8,
    /// Reset button wiring
    pub button: PinConfig,
    /// Strip data pin
    pub strip: PinConfig,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            slot: 0,
            name: String::new(),
            unit: TimeUnit::Days,
            enabled: true,
            period: 12,
            pixels_total: 12,
            pixels_per_unit_scaled: PIXELS_PER_UNIT_SCALE,
            normal_color: Color::RED,
            alert_color: Color::BLUE,
            tone_hz: 800,
            channel: 0,
            button: PinConfig::with_pullup(0),
            strip: PinConfig::new(27),
        }
    }
}

/// Button timing shared by all inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// Presses shorter than this are bounces
    pub debounce_ms: u32,
    /// Presses at least this long reset the timer
    pub long_press_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2,
            long_press_ms: 3000,
        }
    }
}

/// Alert buzzer behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BuzzerConfig {
    pub enabled: bool,
    /// Shared alert tone
    pub tone_hz: u16,
    /// Minimum seconds between the starts of two pulses
    pub gap_s: u32,
    /// Length of one pulse
    pub length_ms: u32,
    /// Use the first overdue timer's tone instead of the shared one
    pub per_timer_tone: bool,
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tone_hz: 800,
            gap_s: 5,
            length_ms: 100,
            per_timer_tone: false,
        }
    }
}

/// LED strip settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorConfig {
    /// Global brightness (0-255)
    pub brightness: u8,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self { brightness: 128 }
    }
}

/// Where the bridge forwards reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub remote_ip: [u8; 4],
    pub remote_port: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            remote_ip: [192, 168, 0, 126],
            remote_port: 31230,
        }
    }
}

impl From<LinkConfig> for upkeep_protocol::RemoteAddress {
    fn from(link: LinkConfig) -> Self {
        Self {
            ip: link.remote_ip,
            port: link.remote_port,
        }
    }
}

/// Complete system configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig {
    /// Discard persisted progress at boot and start from zero
    pub clear_saved: bool,
    pub timers: Vec<TimerConfig, MAX_TIMERS>,
    pub input: InputConfig,
    pub buzzer: BuzzerConfig,
    pub indicator: IndicatorConfig,
    pub link: LinkConfig,
}

impl SystemConfig {
    /// Find a timer by name
    pub fn find_timer(&self, name: &str) -> Option<&TimerConfig> {
        self.timers.iter().find(|t| t.name.as_str() == name)
    }
}
