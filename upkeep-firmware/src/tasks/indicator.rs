//! LED strip task
//!
//! Receives [`IndicatorFrame`]s and drives one WS2812 strip per channel.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use portable_atomic::Ordering;

use upkeep_core::IndicatorFrame;
use upkeep_drivers::PixelFrame;
use upkeep_hal_rp2040::ws2812::PioWs2812;

use crate::channels::{RENDER_CHANNEL, RENDER_DROPS};

/// Longest strip the pixel buffer holds
pub const MAX_PIXELS: usize = 64;

/// The board's three strips on PIO0
pub struct Strips {
    pub strip0: PioWs2812<'static, PIO0, 0>,
    pub strip1: PioWs2812<'static, PIO0, 1>,
    pub strip2: PioWs2812<'static, PIO0, 2>,
}

#[embassy_executor::task]
pub async fn indicator_task(mut strips: Strips, brightness: u8) {
    info!("Indicator task started (brightness {})", brightness);

    let mut pixels: PixelFrame<MAX_PIXELS> = PixelFrame::new(brightness);
    let mut reported_drops: u32 = 0;

    loop {
        let frame = RENDER_CHANNEL.receive().await;
        render(&mut strips, &mut pixels, &frame).await;

        let drops = RENDER_DROPS.load(Ordering::Relaxed);
        if drops != reported_drops {
            debug!("{} strip frames dropped so far", drops);
            reported_drops = drops;
        }
    }
}

async fn render(strips: &mut Strips, pixels: &mut PixelFrame<MAX_PIXELS>, frame: &IndicatorFrame) {
    trace!(
        "Strip {}: {}/{} lit",
        frame.channel,
        frame.lit,
        frame.total
    );

    let data = pixels.fill(frame.color, frame.total, frame.lit);

    match frame.channel {
        0 => strips.strip0.write(data).await,
        1 => strips.strip1.write(data).await,
        2 => strips.strip2.write(data).await,
        other => warn!("No strip for channel {}", other),
    }
}
