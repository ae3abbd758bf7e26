//! Error type for hex color parsing.

use std::fmt;

/// Error type for parsing hex color strings.
///
/// Returned when a hex string has the wrong number of digits or contains a
/// character that is not a hexadecimal digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 digits after stripping '#')
    InvalidLength(usize),
    /// Non-hexadecimal character at the given position (after stripping '#')
    InvalidDigit {
        /// Zero-based position of the offending character
        position: usize,
    },
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength(len) => {
                write!(
                    f,
                    "invalid hex color length {} (expected 3 or 6 digits)",
                    len
                )
            }
            ParseColorError::InvalidDigit { position } => {
                write!(f, "invalid hex digit at position {}", position)
            }
        }
    }
}

impl std::error::Error for ParseColorError {}
