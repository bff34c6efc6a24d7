//! Board wiring
//!
//! Embassy pins are typed peripherals, so the pins are fixed at compile
//! time. The `button`/`strip` entries of upkeep.toml describe the intended
//! wiring and are checked against these at boot.

use defmt::*;

use upkeep_core::config::SystemConfig;

/// Reset buttons, in timer order (pull-up, pressed pulls low)
pub const BUTTON_PINS: [u8; 3] = [0, 1, 2];

/// WS2812 data pins, in strip channel order (PIO0 SM0..SM2)
pub const STRIP_PINS: [u8; 3] = [27, 22, 18];

/// Passive buzzer (PWM slice 6, channel A)
pub const BUZZER_PIN: u8 = 28;

/// Bridge UART0 TX/RX
pub const LINK_TX_PIN: u8 = 16;
pub const LINK_RX_PIN: u8 = 17;

/// Warn about timers the board cannot serve as configured
///
/// Returns the number of mismatches found.
pub fn check_wiring(config: &SystemConfig) -> usize {
    let mut mismatches = 0;

    for (i, timer) in config.timers.iter().enumerate() {
        match BUTTON_PINS.get(i) {
            Some(&pin) if pin == timer.button.pin => {}
            Some(&pin) => {
                warn!(
                    "Timer '{}' button configured on gpio{}, board uses gpio{}",
                    timer.name.as_str(),
                    timer.button.pin,
                    pin
                );
                mismatches += 1;
            }
            None => {
                warn!("Timer '{}' has no reset button on this board", timer.name.as_str());
                mismatches += 1;
            }
        }

        match STRIP_PINS.get(timer.channel as usize) {
            Some(&pin) if pin == timer.strip.pin => {}
            Some(&pin) => {
                warn!(
                    "Timer '{}' strip configured on gpio{}, board uses gpio{}",
                    timer.name.as_str(),
                    timer.strip.pin,
                    pin
                );
                mismatches += 1;
            }
            None => {
                warn!("Timer '{}' has no LED strip on this board", timer.name.as_str());
                mismatches += 1;
            }
        }
    }

    mismatches
}
