//! 8-bit sRGB color type
//!
//! Color lists store their entries as hex strings. `Rgb` is the parsed,
//! byte-exact form every other representation is derived from.

use std::fmt;
use std::str::FromStr;

use super::error::ParseColorError;

/// A color in 8-bit sRGB.
///
/// This is the byte-exact form of a hex color like `#1a2b3c`. Derived
/// representations ([`Lab`](super::Lab), [`Oklab`](super::Oklab),
/// [`Hsl`](super::Hsl)) are all computed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red channel (0..=255)
    pub r: u8,
    /// Green channel (0..=255)
    pub g: u8,
    /// Blue channel (0..=255)
    pub b: u8,
}

impl Rgb {
    /// Black (`#000000`).
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// White (`#ffffff`).
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Create a color from its three channels.
    ///
    /// # Example
    /// ```
    /// use color_vptree::Rgb;
    /// let red = Rgb::new(255, 0, 0);
    /// assert_eq!(red.to_hex(), "#ff0000");
    /// ```
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to 0.0..=1.0 (still gamma-encoded).
    #[inline]
    pub fn to_unit(self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }

    /// Canonical lowercase `#rrggbb` form.
    ///
    /// Two hex strings that parse to the same color always produce the same
    /// canonical form, which makes it usable as a cache key.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse a color from a hex string.
    ///
    /// Supports the following formats:
    /// - `#RRGGBB` / `RRGGBB` - standard 6-digit hex
    /// - `#RGB` / `RGB` - shorthand 3-digit hex (expands to RRGGBB)
    ///
    /// Parsing is case-insensitive. Leading and trailing whitespace is trimmed.
    ///
    /// # Examples
    ///
    /// ```
    /// use color_vptree::Rgb;
    ///
    /// let white: Rgb = "#FFFFFF".parse().unwrap();
    /// assert_eq!(white, Rgb::WHITE);
    ///
    /// let red: Rgb = "f00".parse().unwrap();
    /// assert_eq!(red, Rgb::new(255, 0, 0));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        let mut digits = [0u8; 6];
        let mut len = 0;
        for (position, c) in s.chars().enumerate() {
            let value = c
                .to_digit(16)
                .ok_or(ParseColorError::InvalidDigit { position })?;
            if len == digits.len() {
                return Err(ParseColorError::InvalidLength(s.chars().count()));
            }
            digits[len] = value as u8;
            len += 1;
        }

        match len {
            // Shorthand: expand each digit by multiplying by 17 (0xF -> 0xFF)
            3 => Ok(Self::new(digits[0] * 17, digits[1] * 17, digits[2] * 17)),
            6 => Ok(Self::new(
                (digits[0] << 4) | digits[1],
                (digits[2] << 4) | digits[3],
                (digits[4] << 4) | digits[5],
            )),
            _ => Err(ParseColorError::InvalidLength(len)),
        }
    }
}
