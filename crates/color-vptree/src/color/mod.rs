//! Color types and conversion utilities
//!
//! - [`Rgb`]: byte-exact sRGB, parsed from and formatted to hex
//! - [`Lab`]: CIE L*a*b* (D65), coordinates of the default metric
//! - [`Oklab`]: perceptually uniform alternative metric space
//! - [`Hsl`]: hue/saturation/lightness, for display only
//!
//! # Example
//!
//! ```
//! use color_vptree::{Lab, Rgb};
//!
//! let rgb: Rgb = "#808080".parse().unwrap();
//! let lab = Lab::from(rgb);
//! assert!(lab.a.abs() < 0.01);
//! ```

mod error;
mod hsl;
mod lab;
mod oklab;
mod rgb;
mod transfer;

pub use error::ParseColorError;
pub use hsl::Hsl;
pub use lab::Lab;
pub use oklab::Oklab;
pub use rgb::Rgb;
pub use transfer::{linear_to_srgb, srgb_to_linear};
