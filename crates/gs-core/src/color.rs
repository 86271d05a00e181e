use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::frame::luma;

/// Couleur RGBA 8 bits, non prémultipliée.
///
/// # Example
/// ```
/// use gs_core::color::Rgba;
/// let c: Rgba = "FF000080".parse().unwrap();
/// assert_eq!(c, Rgba(255, 0, 0, 128));
/// assert_eq!(c.to_string(), "FF000080");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self(255, 255, 255, 255);

    /// Parse an `RRGGBBAA` hex string. A leading `#` is accepted.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidColor` unless the input is exactly 8 hex digits.
    ///
    /// # Example
    /// ```
    /// use gs_core::color::Rgba;
    /// assert_eq!(Rgba::from_hex("#000000ff").unwrap(), Rgba(0, 0, 0, 255));
    /// assert!(Rgba::from_hex("FFF").is_err());
    /// ```
    pub fn from_hex(input: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidColor {
            input: input.to_string(),
        };
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        let [r, g, b, a] = value.to_be_bytes();
        Ok(Self(r, g, b, a))
    }

    /// BT.709 luma of the color channels, used when painting a gray buffer.
    #[inline(always)]
    #[must_use]
    pub fn luma(self) -> u8 {
        luma(self.0, self.1, self.2)
    }

    /// Channels as an array, in memory order.
    #[inline(always)]
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.0, self.1, self.2, self.3]
    }
}

impl FromStr for Rgba {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}{:02X}", self.0, self.1, self.2, self.3)
    }
}
