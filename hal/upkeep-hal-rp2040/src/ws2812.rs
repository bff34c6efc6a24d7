//! PIO WS2812 LED strip driver
//!
//! One PIO program is loaded per block and shared by every strip; each
//! strip gets its own state machine and data pin.

use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, LoadedProgram, PioPin,
    ShiftConfig, ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use embassy_time::Timer;
use fixed::types::U24F8;
use smart_leds::RGB8;

use crate::pio::{calc_clock_divider, grb_word, CYCLES_PER_BIT, LATCH_US, WS2812_BIT_HZ};

/// Time to shift out one pixel (24 bits at 800kHz)
const PIXEL_US: u64 = 30;

/// WS2812 program loaded into a PIO block
pub struct Ws2812Program<'d, PIO: Instance> {
    prg: LoadedProgram<'d, PIO>,
}

impl<'d, PIO: Instance> Ws2812Program<'d, PIO> {
    /// Load the program into `common`
    pub fn new(common: &mut Common<'d, PIO>) -> Self {
        // Delays are T3-1, T1-1 and T2-1 from crate::pio
        let prg = pio::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "out x, 1       side 0 [2]",
            "jmp !x do_zero side 1 [1]",
            "jmp bitloop    side 1 [4]",
            "do_zero:",
            "nop            side 0 [4]",
            ".wrap"
        );

        let prg = common.load_program(&prg.program);
        Self { prg }
    }
}

/// One WS2812 strip on a PIO state machine
pub struct PioWs2812<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
}

impl<'d, PIO: Instance, const SM: usize> PioWs2812<'d, PIO, SM> {
    /// Create a strip driver
    ///
    /// # Arguments
    /// * `common` - PIO common resources (for pin setup)
    /// * `sm` - State machine to use
    /// * `pin` - Data pin (must be PIO-capable)
    /// * `program` - Program previously loaded into the same PIO block
    pub fn new(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        pin: Peri<'d, impl PioPin>,
        program: &Ws2812Program<'d, PIO>,
    ) -> Self {
        let out_pin = common.make_pio_pin(pin);

        let mut cfg = Config::default();
        cfg.set_out_pins(&[&out_pin]);
        cfg.set_set_pins(&[&out_pin]);
        cfg.use_program(&program.prg, &[&out_pin]);

        let (int_div, frac_div) = calc_clock_divider(WS2812_BIT_HZ, CYCLES_PER_BIT);
        let divider_bits = ((int_div as u32) << 8) | (frac_div as u32);
        cfg.clock_divider = U24F8::from_bits(divider_bits);

        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 24,
            direction: ShiftDirection::Left,
        };

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&out_pin]);
        sm.set_enable(true);

        Self { sm }
    }

    /// Send a frame and wait for the strip to latch it
    pub async fn write(&mut self, pixels: &[RGB8]) {
        for &pixel in pixels {
            self.sm.tx().wait_push(grb_word(pixel)).await;
        }

        // FIFO drained; the last pixel may still be shifting out
        while !self.sm.tx().empty() {
            Timer::after_micros(PIXEL_US).await;
        }
        Timer::after_micros(PIXEL_US + LATCH_US).await;
    }
}
