//! TUI color theme
//!
//! Chrome colors for the frame, plus conversion of event colors to terminal
//! colors.

use gfxscope_common::Rgb;
use ratatui::style::Color;

pub const ACCENT: Color = Color::Rgb(51, 153, 255);
pub const CAUTION_AMBER: Color = Color::Rgb(255, 191, 0);
pub const CRITICAL_RED: Color = Color::Rgb(255, 0, 0);
pub const INFO_DIM: Color = Color::Rgb(150, 150, 150);
pub const TEXT: Color = Color::Rgb(230, 230, 230);
pub const BACKGROUND: Color = Color::Rgb(20, 20, 24);

/// Terminal color of an event color.
#[must_use]
pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Composite `overlay` at `opacity` over `base`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend(base: Rgb, overlay: Rgb, opacity: f64) -> Rgb {
    let mix = |b: u8, o: u8| -> u8 {
        (f64::from(b) * (1.0 - opacity) + f64::from(o) * opacity).round().clamp(0.0, 255.0) as u8
    };
    Rgb(mix(base.0, overlay.0), mix(base.1, overlay.1), mix(base.2, overlay.2))
}

/// Color for a usage percentage
/// - Above 40%: Critical (Red)
/// - Above 20%: Caution (Amber)
/// - Otherwise: Accent
#[must_use]
pub fn usage_color(percentage: f64) -> Color {
    if percentage > 40.0 {
        CRITICAL_RED
    } else if percentage > 20.0 {
        CAUTION_AMBER
    } else {
        ACCENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfxscope_common::{BAND_COLOR, BLACK};

    #[test]
    fn test_blend_darkens_toward_black() {
        assert_eq!(blend(BAND_COLOR, BLACK, 0.1), Rgb(190, 190, 190));
        assert_eq!(blend(BAND_COLOR, BLACK, 0.0), BAND_COLOR);
    }
}
