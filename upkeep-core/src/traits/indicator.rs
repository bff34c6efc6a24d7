//! Visual and audible outputs

use crate::config::Color;

/// Progress indicator: one LED strip per channel
pub trait Indicator {
    /// Light the first `lit` of `total` positions on `channel` in `color`
    ///
    /// Implementations must clamp `lit` to `total`. Remaining positions
    /// are turned off.
    fn render(&mut self, channel: u8, color: Color, total: u16, lit: u16);
}

/// Alert buzzer
pub trait ToneOutput {
    /// Sound `Some(hz)` or silence the buzzer with `None`
    fn set_tone(&mut self, tone_hz: Option<u16>);
}
