//! Atlas de glyphes 8×8 figés.
//!
//! Two closed sets: ten brightness glyphs ordered from empty to dense, and four
//! line-drawing glyphs for edge cells. Each row is one byte, bit `x` (LSB first)
//! lights column `x`.

use std::f64::consts::PI;

/// Side of a glyph, and of a cell, in pixels.
pub const GLYPH_SIZE: usize = 8;

/// Immutable 8×8 monochrome bitmap.
///
/// # Example
/// ```
/// use gs_core::glyph::Glyph;
/// let g = Glyph([0x01, 0, 0, 0, 0, 0, 0, 0x80]);
/// assert_eq!(g.bit(0, 0), 1);
/// assert_eq!(g.bit(7, 7), 1);
/// assert_eq!(g.bit(1, 0), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Glyph(pub [u8; GLYPH_SIZE]);

impl Glyph {
    /// Bit at column `x`, row `y`, as 0 or 1.
    #[inline(always)]
    #[must_use]
    pub const fn bit(&self, x: usize, y: usize) -> u8 {
        (self.0[y] >> x) & 1
    }

    /// Number of lit pixels.
    #[must_use]
    pub fn coverage(&self) -> u32 {
        self.0.iter().map(|row| row.count_ones()).sum()
    }
}

/// Glyphes de luminance, du plus clair au plus dense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BrightnessGlyph {
    Space,
    Dot,
    Colon,
    LowerC,
    LowerO,
    UpperP,
    UpperO,
    Question,
    Percent,
    Square,
}

const BRIGHTNESS_BITMAPS: [Glyph; BrightnessGlyph::COUNT] = [
    Glyph([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    Glyph([0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x00]),
    Glyph([0x00, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0x00]),
    Glyph([0x00, 0x00, 0x1E, 0x33, 0x03, 0x33, 0x1E, 0x00]),
    Glyph([0x00, 0x00, 0x1E, 0x33, 0x33, 0x33, 0x1E, 0x00]),
    Glyph([0x3F, 0x66, 0x66, 0x3E, 0x06, 0x06, 0x0F, 0x00]),
    Glyph([0x1C, 0x36, 0x63, 0x63, 0x63, 0x36, 0x1C, 0x00]),
    Glyph([0x1E, 0x33, 0x30, 0x18, 0x0C, 0x00, 0x0C, 0x00]),
    Glyph([0x00, 0x63, 0x33, 0x18, 0x0C, 0x66, 0x63, 0x00]),
    Glyph([0x00, 0x7E, 0x7E, 0x7E, 0x7E, 0x7E, 0x7E, 0x00]),
];

impl BrightnessGlyph {
    /// Size of the brightness set.
    pub const COUNT: usize = 10;

    /// Every brightness glyph, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Space,
        Self::Dot,
        Self::Colon,
        Self::LowerC,
        Self::LowerO,
        Self::UpperP,
        Self::UpperO,
        Self::Question,
        Self::Percent,
        Self::Square,
    ];

    /// Position in `ALL`.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Fixed bitmap of this glyph.
    #[inline(always)]
    #[must_use]
    pub const fn glyph(self) -> &'static Glyph {
        &BRIGHTNESS_BITMAPS[self as usize]
    }

    /// ASCII character the bitmap depicts.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Space => ' ',
            Self::Dot => '.',
            Self::Colon => ':',
            Self::LowerC => 'c',
            Self::LowerO => 'o',
            Self::UpperP => 'P',
            Self::UpperO => 'O',
            Self::Question => '?',
            Self::Percent => '%',
            Self::Square => '#',
        }
    }
}

/// Glyphes directionnels pour les cellules de contour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeGlyph {
    /// `_`
    Horizontal,
    /// `/`
    ForwardSlash,
    /// `|`
    Vertical,
    /// `\`
    Backslash,
}

const EDGE_BITMAPS: [Glyph; EdgeGlyph::COUNT] = [
    Glyph([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF]),
    Glyph([0x60, 0x30, 0x18, 0x0C, 0x06, 0x03, 0x01, 0x00]),
    Glyph([0x18, 0x18, 0x18, 0x00, 0x18, 0x18, 0x18, 0x00]),
    Glyph([0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x40, 0x00]),
];

impl EdgeGlyph {
    /// Size of the edge set.
    pub const COUNT: usize = 4;

    /// Every edge glyph, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Horizontal,
        Self::ForwardSlash,
        Self::Vertical,
        Self::Backslash,
    ];

    /// Position in `ALL`.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Fixed bitmap of this glyph.
    #[inline(always)]
    #[must_use]
    pub const fn glyph(self) -> &'static Glyph {
        &EDGE_BITMAPS[self as usize]
    }

    /// ASCII character the bitmap depicts.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Horizontal => '_',
            Self::ForwardSlash => '/',
            Self::Vertical => '|',
            Self::Backslash => '\\',
        }
    }
}

/// Map a brightness value to a glyph: `index = gray * (COUNT - 1) / 255`.
///
/// # Example
/// ```
/// use gs_core::glyph::{grayscale_to_glyph, BrightnessGlyph};
/// assert_eq!(grayscale_to_glyph(0), BrightnessGlyph::Space);
/// assert_eq!(grayscale_to_glyph(255), BrightnessGlyph::Square);
/// ```
#[inline(always)]
#[must_use]
pub fn grayscale_to_glyph(gray: u8) -> BrightnessGlyph {
    BrightnessGlyph::ALL[usize::from(gray) * (BrightnessGlyph::COUNT - 1) / 255]
}

/// Map a gradient direction in radians to a line glyph.
///
/// The gradient is perpendicular to the drawn line, which is why the two
/// diagonal ranges flip sign.
///
/// # Example
/// ```
/// use gs_core::glyph::{angle_to_edge_glyph, EdgeGlyph};
/// use std::f64::consts::PI;
/// assert_eq!(angle_to_edge_glyph(0.0), EdgeGlyph::Horizontal);
/// assert_eq!(angle_to_edge_glyph(PI / 2.0), EdgeGlyph::Vertical);
/// assert_eq!(angle_to_edge_glyph(PI / 4.0), EdgeGlyph::ForwardSlash);
/// ```
#[must_use]
pub fn angle_to_edge_glyph(angle: f64) -> EdgeGlyph {
    let theta = angle / PI;
    let a = theta.abs();
    if a < 0.05 {
        EdgeGlyph::Horizontal
    } else if a < 0.45 {
        if theta > 0.0 {
            EdgeGlyph::ForwardSlash
        } else {
            EdgeGlyph::Backslash
        }
    } else if a < 0.55 {
        EdgeGlyph::Vertical
    } else if a < 0.9 {
        if theta > 0.0 {
            EdgeGlyph::Backslash
        } else {
            EdgeGlyph::ForwardSlash
        }
    } else {
        EdgeGlyph::Horizontal
    }
}
