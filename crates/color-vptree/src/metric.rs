//! Distance metrics for the vantage-point tree.
//!
//! Pruning in [`VpTree`](crate::VpTree) is only exact when the distance is a
//! true metric: non-negative, symmetric, zero on identical points, and
//! respecting the triangle inequality. All metrics here are Euclidean
//! distances in some 3-D projection of the color, which satisfies all four.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::color::{Lab, Oklab, Rgb};

/// A point in a 3-D color space.
pub type Point3 = [f64; 3];

/// Distance between two points of type `P`.
pub trait Metric<P> {
    /// Distance between `a` and `b`.
    fn distance(&self, a: &P, b: &P) -> f64;
}

/// A color metric: projects an sRGB color into coordinates and measures
/// distances between projections.
pub trait ColorMetric: Send + Sync + fmt::Debug {
    /// Stable name used in configuration and logs.
    fn name(&self) -> &str;

    /// Coordinates of `rgb` in this metric's space.
    fn project(&self, rgb: Rgb) -> Point3;

    /// Distance between two projected points. Euclidean by default.
    #[inline]
    fn distance(&self, a: &Point3, b: &Point3) -> f64 {
        euclidean(a, b)
    }
}

impl<M: ColorMetric + ?Sized> Metric<Point3> for M {
    #[inline]
    fn distance(&self, a: &Point3, b: &Point3) -> f64 {
        ColorMetric::distance(self, a, b)
    }
}

impl<M: ColorMetric + ?Sized> ColorMetric for Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn project(&self, rgb: Rgb) -> Point3 {
        (**self).project(rgb)
    }

    #[inline]
    fn distance(&self, a: &Point3, b: &Point3) -> f64 {
        ColorMetric::distance(&**self, a, b)
    }
}

/// Euclidean distance between two 3-D points.
#[inline]
pub fn euclidean(a: &Point3, b: &Point3) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    (d0 * d0 + d1 * d1 + d2 * d2).sqrt()
}

/// Built-in color metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceMetric {
    /// CIE 1976 ΔE*ab: Euclidean distance in CIE Lab (D65).
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "lab", alias = "deltae"))]
    Cie76,
    /// Euclidean distance in Oklab.
    Oklab,
    /// Euclidean distance between raw sRGB bytes.
    ///
    /// Not perceptual; mostly useful for reproducing naive matchers.
    #[cfg_attr(feature = "serde", serde(alias = "srgb"))]
    Rgb,
}

impl DistanceMetric {
    /// All built-in metrics, in declaration order.
    pub const ALL: [DistanceMetric; 3] = [
        DistanceMetric::Cie76,
        DistanceMetric::Oklab,
        DistanceMetric::Rgb,
    ];
}

impl ColorMetric for DistanceMetric {
    fn name(&self) -> &str {
        match self {
            DistanceMetric::Cie76 => "cie76",
            DistanceMetric::Oklab => "oklab",
            DistanceMetric::Rgb => "rgb",
        }
    }

    fn project(&self, rgb: Rgb) -> Point3 {
        match self {
            DistanceMetric::Cie76 => Lab::from(rgb).to_array(),
            DistanceMetric::Oklab => Oklab::from(rgb).to_array(),
            DistanceMetric::Rgb => [rgb.r as f64, rgb.g as f64, rgb.b as f64],
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a metric name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetricError(pub String);

impl fmt::Display for UnknownMetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown distance metric '{}' (expected cie76, oklab or rgb)",
            self.0
        )
    }
}

impl std::error::Error for UnknownMetricError {}

impl FromStr for DistanceMetric {
    type Err = UnknownMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cie76" | "lab" | "deltae" => Ok(DistanceMetric::Cie76),
            "oklab" => Ok(DistanceMetric::Oklab),
            "rgb" | "srgb" => Ok(DistanceMetric::Rgb),
            _ => Err(UnknownMetricError(s.to_string())),
        }
    }
}
