//! Button bank
//!
//! Samples every reset button once per loop iteration. Classification
//! into short and long presses happens in `upkeep_core::DebouncedInput`;
//! this driver only delivers raw levels in timer order.

use embedded_hal::digital::InputPin;
use heapless::Vec;
use upkeep_core::config::PinConfig;

/// Raw level sampler for up to `N` buttons
pub struct ButtonBank<P, const N: usize> {
    pins: Vec<P, N>,
    /// Level reported when a pin cannot be read (the released level)
    idle: Vec<bool, N>,
    levels: [bool; N],
    read_errors: u32,
}

impl<P: InputPin, const N: usize> ButtonBank<P, N> {
    pub fn new() -> Self {
        Self {
            pins: Vec::new(),
            idle: Vec::new(),
            levels: [false; N],
            read_errors: 0,
        }
    }

    /// Add the next button
    ///
    /// Returns the pin back if the bank is full.
    pub fn add(&mut self, pin: P, config: &PinConfig) -> Result<(), P> {
        self.pins.push(pin)?;
        let released = !config.active_high();
        // Cannot fail: idle has the same capacity as pins
        let _ = self.idle.push(released);
        self.levels[self.pins.len() - 1] = released;
        Ok(())
    }

    /// Read all pins
    ///
    /// A pin that fails to read is reported as released.
    pub fn sample(&mut self) -> &[bool] {
        for (i, pin) in self.pins.iter_mut().enumerate() {
            self.levels[i] = match pin.is_high() {
                Ok(level) => level,
                Err(_) => {
                    self.read_errors = self.read_errors.wrapping_add(1);
                    self.idle[i]
                }
            };
        }
        &self.levels[..self.pins.len()]
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Total failed reads since creation
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }
}

impl<P: InputPin, const N: usize> Default for ButtonBank<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    /// Mock input pin for testing
    struct MockPin<'a> {
        level: &'a Cell<Option<bool>>,
    }

    impl ErrorType for MockPin<'_> {
        type Error = ErrorKind;
    }

    impl InputPin for MockPin<'_> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.level.get().ok_or(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|h| !h)
        }
    }

    #[test]
    fn test_sample_in_order() {
        let a = Cell::new(Some(true));
        let b = Cell::new(Some(false));
        let mut bank: ButtonBank<MockPin, 4> = ButtonBank::new();
        bank.add(MockPin { level: &a }, &PinConfig::with_pullup(0)).ok();
        bank.add(MockPin { level: &b }, &PinConfig::with_pullup(1)).ok();

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.sample(), &[true, false]);

        a.set(Some(false));
        assert_eq!(bank.sample(), &[false, false]);
    }

    #[test]
    fn test_read_error_reports_released() {
        let pulled_up = Cell::new(None);
        let active_high = Cell::new(None);
        let mut bank: ButtonBank<MockPin, 2> = ButtonBank::new();
        bank.add(MockPin { level: &pulled_up }, &PinConfig::with_pullup(0))
            .ok();
        bank.add(MockPin { level: &active_high }, &PinConfig::new(1))
            .ok();

        assert_eq!(bank.sample(), &[true, false]);
        assert_eq!(bank.read_errors(), 2);
    }

    #[test]
    fn test_bank_full() {
        let level = Cell::new(Some(true));
        let mut bank: ButtonBank<MockPin, 1> = ButtonBank::new();
        assert!(bank.add(MockPin { level: &level }, &PinConfig::new(0)).is_ok());
        assert!(bank.add(MockPin { level: &level }, &PinConfig::new(1)).is_err());
    }
}
