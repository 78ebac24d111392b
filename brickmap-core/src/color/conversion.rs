//! Colour space conversion and RGB-space adjustments

use super::{Hsl, Rgb};

/// Clamp `value` into `[min, max]`.
///
/// Works for any partially ordered value; a NaN input is returned unchanged.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Convert an 8-bit RGB colour to HSL.
///
/// Saturation and lightness are rounded to whole percent. Hue stays in the
/// unrounded degree domain, normalised to `[0, 360)`; greys get hue 0.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let lightness = (min + max) * 0.5;

    let saturation = if delta == 0.0 {
        0.0
    } else if lightness < 0.5 {
        delta / (2.0 * lightness)
    } else {
        delta / (2.0 - 2.0 * lightness)
    };

    let mut hue = 0.0;
    if delta > 0.0 {
        // max is one of r, g, b exactly, so equality picks the sector
        let sector = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        hue = sector * 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }
    }

    Hsl::new(hue, (saturation * 100.0).round(), (lightness * 100.0).round())
}

/// Contrast stretch in RGB space.
///
/// `amount` is expected in `[-255, 255]`; 0 leaves the colour unchanged.
/// Each channel is clamped to `[0, 255]` and rounded.
pub fn contrast(rgb: Rgb, amount: f64) -> Rgb {
    let factor = (259.0 * (amount + 255.0)) / (255.0 * (259.0 - amount));
    let stretch = |channel: u8| -> u8 {
        let value = factor * (channel as f64 - 128.0) + 128.0;
        clamp(value, 0.0, 255.0).round() as u8
    };

    Rgb::new(stretch(rgb.r), stretch(rgb.g), stretch(rgb.b))
}
