//! Derived representations of a color.
//!
//! Hydration is a pure function of the color: the same hex always yields
//! the same [`ColorProfile`]. Callers that want memoization key a cache by
//! the canonical hex; nothing here caches.

use std::fmt;

use crate::color::{srgb_to_linear, Hsl, Lab, Rgb};

/// Text color that reads best on top of a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Contrast {
    /// Dark text, for light backgrounds
    Black,
    /// Light text, for dark backgrounds
    White,
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contrast::Black => f.write_str("black"),
            Contrast::White => f.write_str("white"),
        }
    }
}

/// Everything derivable from a color without knowing its name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ColorProfile {
    /// Canonical `#rrggbb`
    pub hex: String,
    /// 8-bit sRGB channels
    pub rgb: Rgb,
    /// Hue in degrees, saturation and lightness in percent
    pub hsl: Hsl,
    /// CIELAB under D65
    pub lab: Lab,
    /// HSP perceived brightness, 0.0..=255.0
    pub luminance: f64,
    /// WCAG relative luminance, 0.0..=1.0
    #[cfg_attr(feature = "serde", serde(rename = "luminanceWCAG"))]
    pub luminance_wcag: f64,
    /// Text color with the higher WCAG contrast ratio on this background
    pub best_contrast: Contrast,
}

/// Derive the full profile of `rgb`.
///
/// # Example
///
/// ```
/// use color_vptree::{hydrate, Contrast, Rgb};
///
/// let profile = hydrate(Rgb::new(0x11, 0x11, 0x11));
/// assert_eq!(profile.hex, "#111111");
/// assert_eq!(profile.best_contrast, Contrast::White);
/// ```
pub fn hydrate(rgb: Rgb) -> ColorProfile {
    let luminance_wcag = wcag_luminance(rgb);
    ColorProfile {
        hex: rgb.to_hex(),
        rgb,
        hsl: Hsl::from(rgb),
        lab: Lab::from(rgb),
        luminance: hsp_luminance(rgb),
        luminance_wcag,
        best_contrast: best_contrast_for(luminance_wcag),
    }
}

/// HSP perceived brightness: `sqrt(0.299 r² + 0.587 g² + 0.114 b²)`.
///
/// See <https://alienryderflex.com/hsp.html>.
pub fn hsp_luminance(rgb: Rgb) -> f64 {
    let r = rgb.r as f64;
    let g = rgb.g as f64;
    let b = rgb.b as f64;
    (0.299 * r * r + 0.587 * g * g + 0.114 * b * b).sqrt()
}

/// WCAG 2.x relative luminance.
pub fn wcag_luminance(rgb: Rgb) -> f64 {
    let [r, g, b] = rgb.to_unit().map(srgb_to_linear);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// WCAG contrast ratio between two relative luminances (1.0..=21.0).
pub fn contrast_ratio(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    (hi + 0.05) / (lo + 0.05)
}

/// Black or white, whichever has the higher contrast ratio against `rgb`.
/// Ties go to black.
pub fn best_contrast(rgb: Rgb) -> Contrast {
    best_contrast_for(wcag_luminance(rgb))
}

fn best_contrast_for(luminance: f64) -> Contrast {
    if contrast_ratio(luminance, 1.0) > contrast_ratio(luminance, 0.0) {
        Contrast::White
    } else {
        Contrast::Black
    }
}
