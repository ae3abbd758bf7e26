//! HSL representation of an sRGB color.

use super::rgb::Rgb;

/// Hue, saturation and lightness.
///
/// `h` is in degrees (0.0..360.0); `s` and `l` are percentages (0.0..=100.0).
/// Achromatic colors report a hue of 0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Hsl {
    /// Hue in degrees
    pub h: f64,
    /// Saturation in percent
    pub s: f64,
    /// Lightness in percent
    pub l: f64,
}

impl From<Rgb> for Hsl {
    fn from(rgb: Rgb) -> Self {
        let [r, g, b] = rgb.to_unit();
        let max_byte = rgb.r.max(rgb.g).max(rgb.b);
        let min_byte = rgb.r.min(rgb.g).min(rgb.b);
        let max = max_byte as f64 / 255.0;
        let min = min_byte as f64 / 255.0;
        let l = (max + min) / 2.0;

        if max_byte == min_byte {
            return Hsl {
                h: 0.0,
                s: 0.0,
                l: l * 100.0,
            };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };

        let h = if max_byte == rgb.r {
            (g - b) / d + if rgb.g < rgb.b { 6.0 } else { 0.0 }
        } else if max_byte == rgb.g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl {
            h: h * 60.0,
            s: s * 100.0,
            l: l * 100.0,
        }
    }
}
