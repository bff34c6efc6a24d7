//! WS2812 bit timing for the PIO
//!
//! Each data bit is `CYCLES_PER_BIT` PIO cycles long. The program drives
//! the line high for `T1` cycles, then for another `T2` cycles only when
//! the bit is one, then low for the rest. The clock divider stretches the
//! cycles so one bit lasts 1.25µs (800kHz).

use smart_leds::RGB8;

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// WS2812 data rate
pub const WS2812_BIT_HZ: u32 = 800_000;

/// Cycles high at the start of every bit
pub const T1: u8 = 2;
/// Extra cycles high for a one bit
pub const T2: u8 = 5;
/// Cycles low at the end of every bit
pub const T3: u8 = 3;

/// PIO cycles per data bit
pub const CYCLES_PER_BIT: u32 = (T1 + T2 + T3) as u32;

/// Reset (latch) time after a frame, in microseconds
pub const LATCH_US: u64 = 55;

/// Calculate the clock divider for a bit rate
///
/// The PIO program runs at SYS_CLK / divider Hz and spends
/// `cycles_per_bit` cycles on each bit, so:
/// divider = SYS_CLK / (bit_hz * cycles_per_bit)
///
/// Returns (integer_part, fractional_part) for the 16.8 fixed-point divider.
pub fn calc_clock_divider(bit_hz: u32, cycles_per_bit: u32) -> (u16, u8) {
    let divisor = bit_hz as u64 * cycles_per_bit as u64;
    if divisor == 0 {
        return (0xFFFF, 0xFF); // Maximum divider = stopped
    }

    // To get 8-bit fractional precision, multiply by 256 first
    let divider_x256 = (SYS_CLK_HZ as u64 * 256) / divisor;

    let int_part = (divider_x256 / 256).min(0xFFFF) as u16;
    let frac_part = (divider_x256 % 256) as u8;

    (int_part, frac_part)
}

/// Pack a pixel into a TX FIFO word
///
/// WS2812 expects green, red, blue, MSB first. The state machine shifts
/// left and autopulls after 24 bits, so the colour sits in the top three
/// bytes.
pub fn grb_word(color: RGB8) -> u32 {
    (u32::from(color.g) << 24) | (u32::from(color.r) << 16) | (u32::from(color.b) << 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws2812_divider() {
        // 125MHz / (800kHz * 10) = 15.625
        let (int_part, frac_part) = calc_clock_divider(WS2812_BIT_HZ, CYCLES_PER_BIT);
        assert_eq!(int_part, 15);
        assert_eq!(frac_part, 160);
    }

    #[test]
    fn test_zero_rate_is_stopped() {
        assert_eq!(calc_clock_divider(0, CYCLES_PER_BIT), (0xFFFF, 0xFF));
    }

    #[test]
    fn test_grb_order() {
        let word = grb_word(RGB8 { r: 0x11, g: 0x22, b: 0x33 });
        assert_eq!(word, 0x2211_3300);
    }
}
