//! Block fill colours

use brickmap_core::color::{clamp, contrast};
use brickmap_core::{Hsl, Rgb};

/// Convert HSL (degrees, percent, percent) to 8-bit RGB.
///
/// Mirrors how a canvas `hsl()` fill is resolved: hue wraps into
/// `[0, 360)`, saturation and lightness are clamped to `[0, 100]`. Tone
/// filters may push either channel outside that range, so the clamp is
/// needed here.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = if hsl.h.is_finite() { hsl.h.rem_euclid(360.0) / 360.0 } else { 0.0 };
    let s = clamp(finite_or_zero(hsl.s), 0.0, 100.0) / 100.0;
    let l = clamp(finite_or_zero(hsl.l), 0.0, 100.0) / 100.0;

    if s == 0.0 {
        let v = to_byte(l);
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb::new(
        to_byte(hue_channel(p, q, h + 1.0 / 3.0)),
        to_byte(hue_channel(p, q, h)),
        to_byte(hue_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn hue_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(v: f64) -> u8 {
    clamp((v * 255.0).round(), 0.0, 255.0) as u8
}

/// Final RGB fill for a block, with the optional output contrast.
pub fn block_fill(color: Hsl, contrast_amount: Option<f64>) -> Rgb {
    let rgb = hsl_to_rgb(color);
    match contrast_amount {
        Some(amount) => contrast(rgb, amount),
        None => rgb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickmap_core::rgb_to_hsl;

    #[test]
    fn test_primaries() {
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 100.0, 50.0)), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(120.0, 100.0, 50.0)), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(240.0, 100.0, 50.0)), Rgb::new(0, 0, 255));
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 0.0, 100.0)), Rgb::new(255, 255, 255));
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 0.0, 0.0)), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(hsl_to_rgb(Hsl::new(360.0, 100.0, 50.0)), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(-240.0, 100.0, 50.0)), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(480.0, 100.0, 50.0)), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_out_of_range_saturation_and_lightness_clamp() {
        // saturate filters can push saturation past 100
        assert_eq!(
            hsl_to_rgb(Hsl::new(0.0, 180.0, 50.0)),
            hsl_to_rgb(Hsl::new(0.0, 100.0, 50.0))
        );
        assert_eq!(hsl_to_rgb(Hsl::new(200.0, 40.0, -10.0)), Rgb::new(0, 0, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(200.0, 40.0, 130.0)), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_close_to_inverse_of_rgb_to_hsl() {
        // s and l are rounded to whole percent on the way in, so allow a few units
        for rgb in [
            Rgb::new(200, 100, 50),
            Rgb::new(12, 140, 220),
            Rgb::new(90, 90, 90),
            Rgb::new(250, 240, 10),
        ] {
            let back = hsl_to_rgb(rgb_to_hsl(rgb));
            for (a, b) in rgb.to_array().iter().zip(back.to_array().iter()) {
                assert!((*a as i32 - *b as i32).abs() <= 3, "{} -> {}", rgb, back);
            }
        }
    }

    #[test]
    fn test_block_fill_contrast() {
        let grey = Hsl::new(0.0, 0.0, 60.0);
        let plain = block_fill(grey, None);
        let stretched = block_fill(grey, Some(100.0));
        assert_eq!(plain, Rgb::new(153, 153, 153));
        assert!(stretched.r > plain.r);
        assert_eq!(block_fill(grey, Some(0.0)), plain);
    }
}
