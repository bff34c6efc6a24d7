//! Debounced push button
//!
//! Classification happens on release: the time the button stayed pressed
//! decides between a bounce, a short press and a long press.

use crate::config::InputConfig;

/// Result of polling a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressEvent {
    /// Nothing to report (steady level, press start, or bounce)
    None,
    /// Released after the debounce window but before the long-press window
    Short,
    /// Released after being held at least the long-press window
    Long,
}

/// Per-button press classifier
#[derive(Debug, Clone)]
pub struct DebouncedInput {
    /// Raw level that means "pressed"
    active_high: bool,
    /// Last stable state
    pressed: bool,
    /// Timestamp of the last press edge
    press_start_ms: u32,
    debounce_ms: u32,
    long_press_ms: u32,
}

impl DebouncedInput {
    /// Create an input that starts released
    ///
    /// # Arguments
    /// * `active_high` - `false` for buttons to ground with a pull-up
    /// * `config` - debounce and long-press windows
    pub fn new(active_high: bool, config: &InputConfig) -> Self {
        Self {
            active_high,
            pressed: false,
            press_start_ms: 0,
            debounce_ms: config.debounce_ms,
            long_press_ms: config.long_press_ms,
        }
    }

    /// Sample the raw pin level
    pub fn poll(&mut self, level_high: bool, now_ms: u32) -> PressEvent {
        let active = level_high == self.active_high;
        if active == self.pressed {
            return PressEvent::None;
        }

        if active {
            self.pressed = true;
            self.press_start_ms = now_ms;
            return PressEvent::None;
        }

        self.pressed = false;
        let held = now_ms.wrapping_sub(self.press_start_ms);
        if held < self.debounce_ms {
            PressEvent::None
        } else if held < self.long_press_ms {
            PressEvent::Short
        } else {
            PressEvent::Long
        }
    }

    /// Whether the button is currently held down
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
