//! CIE L*a*b* color space (D65 white point)
//!
//! CIE Lab is the coordinate space of the default matching metric
//! ([`DistanceMetric::Cie76`](crate::DistanceMetric::Cie76)): Euclidean
//! distance in Lab is the CIE 1976 color difference ΔE*ab, a true metric.

use super::rgb::Rgb;
use super::transfer::srgb_to_linear;

/// D65 reference white in XYZ.
const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.08883;

/// (6/29)^3, the linear/cube-root crossover of the Lab companding function.
const EPSILON: f64 = 216.0 / 24389.0;
/// (29/6)^2 / 3
const KAPPA_SLOPE: f64 = 841.0 / 108.0;

/// A color in CIE L*a*b* space.
///
/// # Components
///
/// - `l`: Lightness, 0.0 (black) to 100.0 (white)
/// - `a`: Green-red axis (negative = green, positive = red)
/// - `b`: Blue-yellow axis (negative = blue, positive = yellow)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Lab {
    /// Lightness: 0.0 (black) to 100.0 (white)
    pub l: f64,
    /// Green-red axis
    pub a: f64,
    /// Blue-yellow axis
    pub b: f64,
}

impl Lab {
    /// CIE 1976 color difference (Euclidean distance in Lab).
    ///
    /// # Example
    ///
    /// ```
    /// use color_vptree::{Lab, Rgb};
    ///
    /// let black = Lab::from(Rgb::BLACK);
    /// let white = Lab::from(Rgb::WHITE);
    /// assert!((black.delta_e(white) - 100.0).abs() < 0.01);
    /// ```
    #[inline]
    pub fn delta_e(self, other: Lab) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }

    /// Components as a point for the metric-space index.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.l, self.a, self.b]
    }
}

#[inline]
fn compand(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        KAPPA_SLOPE * t + 4.0 / 29.0
    }
}

impl From<Rgb> for Lab {
    /// Convert from sRGB via linear RGB and XYZ (D65).
    fn from(rgb: Rgb) -> Self {
        let [r, g, b] = rgb.to_unit().map(srgb_to_linear);

        // Linear sRGB to XYZ (D65)
        let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
        let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
        let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;

        let fx = compand(x / WHITE_X);
        let fy = compand(y / WHITE_Y);
        let fz = compand(z / WHITE_Z);

        Lab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white() {
        let black = Lab::from(Rgb::BLACK);
        assert!(black.l.abs() < 1e-9);
        assert!(black.a.abs() < 1e-9);
        assert!(black.b.abs() < 1e-9);

        let white = Lab::from(Rgb::WHITE);
        assert!((white.l - 100.0).abs() < 0.01, "white L = {}", white.l);
        assert!(white.a.abs() < 0.01, "white a = {}", white.a);
        assert!(white.b.abs() < 0.01, "white b = {}", white.b);
    }

    #[test]
    fn test_known_primaries() {
        // Reference values for sRGB red in Lab (D65): ~ (53.24, 80.09, 67.20)
        let red = Lab::from(Rgb::new(255, 0, 0));
        assert!((red.l - 53.24).abs() < 0.05, "red L = {}", red.l);
        assert!((red.a - 80.09).abs() < 0.1, "red a = {}", red.a);
        assert!((red.b - 67.20).abs() < 0.1, "red b = {}", red.b);
    }

    #[test]
    fn test_greys_are_neutral() {
        for v in (0..=255u8).step_by(15) {
            let grey = Lab::from(Rgb::new(v, v, v));
            assert!(grey.a.abs() < 0.01, "grey {v} a = {}", grey.a);
            assert!(grey.b.abs() < 0.01, "grey {v} b = {}", grey.b);
        }
    }

    #[test]
    fn test_lightness_monotonic_for_greys() {
        let mut prev = -1.0;
        for v in 0..=255u8 {
            let l = Lab::from(Rgb::new(v, v, v)).l;
            assert!(l > prev, "lightness not increasing at {v}");
            prev = l;
        }
    }
}
