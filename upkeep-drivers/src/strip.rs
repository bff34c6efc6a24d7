//! LED strip frames
//!
//! Turns an indicator request `(color, total, lit)` into the pixel data
//! for one strip, with the global brightness applied.

use smart_leds::RGB8;
use upkeep_core::config::Color;

/// Pixel buffer for a strip of at most `N` LEDs
pub struct PixelFrame<const N: usize> {
    pixels: [RGB8; N],
    brightness: u8,
}

impl<const N: usize> PixelFrame<N> {
    pub const fn new(brightness: u8) -> Self {
        Self {
            pixels: [RGB8 { r: 0, g: 0, b: 0 }; N],
            brightness,
        }
    }

    /// Light the first `lit` of `total` pixels
    ///
    /// `total` is clamped to the buffer and `lit` to `total`. Returns the
    /// pixels to send.
    pub fn fill(&mut self, color: Color, total: u16, lit: u16) -> &[RGB8] {
        let total = (total as usize).min(N);
        let lit = (lit as usize).min(total);
        let on = to_rgb(color.scaled(self.brightness));
        let off = RGB8 { r: 0, g: 0, b: 0 };

        for (i, pixel) in self.pixels[..total].iter_mut().enumerate() {
            *pixel = if i < lit { on } else { off };
        }

        &self.pixels[..total]
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }
}

fn to_rgb(color: Color) -> RGB8 {
    RGB8 {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fill() {
        let mut frame: PixelFrame<12> = PixelFrame::new(255);
        let pixels = frame.fill(Color::RED, 12, 5);

        assert_eq!(pixels.len(), 12);
        assert!(pixels[..5].iter().all(|p| *p == RGB8 { r: 255, g: 0, b: 0 }));
        assert!(pixels[5..].iter().all(|p| *p == RGB8 { r: 0, g: 0, b: 0 }));
    }

    #[test]
    fn test_lit_clamped_to_total() {
        let mut frame: PixelFrame<16> = PixelFrame::new(255);
        let pixels = frame.fill(Color::BLUE, 12, 40);
        assert_eq!(pixels.len(), 12);
        assert!(pixels.iter().all(|p| p.b == 255));
    }

    #[test]
    fn test_total_clamped_to_buffer() {
        let mut frame: PixelFrame<8> = PixelFrame::new(255);
        assert_eq!(frame.fill(Color::RED, 60, 60).len(), 8);
    }

    #[test]
    fn test_brightness_applied() {
        let mut frame: PixelFrame<4> = PixelFrame::new(128);
        let pixels = frame.fill(Color::YELLOW, 4, 4);
        assert_eq!(pixels[0], RGB8 { r: 128, g: 128, b: 0 });
    }

    #[test]
    fn test_shrinking_progress_clears_pixels() {
        let mut frame: PixelFrame<12> = PixelFrame::new(255);
        frame.fill(Color::RED, 12, 12);
        let pixels = frame.fill(Color::RED, 12, 0);
        assert!(pixels.iter().all(|p| *p == RGB8 { r: 0, g: 0, b: 0 }));
    }
}
