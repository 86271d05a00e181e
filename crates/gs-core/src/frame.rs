use crate::error::CoreError;

/// Disposition des canaux d'un `PixelBuffer`.
///
/// Only gray (1) and interleaved RGBA (4) layouts exist.
///
/// # Example
/// ```
/// use gs_core::frame::Channels;
/// assert_eq!(Channels::Rgba.count(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channels {
    /// One luminance sample per pixel.
    Gray = 1,
    /// Interleaved R, G, B, A samples.
    Rgba = 4,
}

impl Channels {
    /// Number of samples per pixel.
    #[inline(always)]
    #[must_use]
    pub const fn count(self) -> usize {
        self as usize
    }
}

/// Luminance perceptuelle BT.709, tronquée sur 8 bits.
///
/// Integer form of `0.2126R + 0.7152G + 0.0722B`; the weights sum to exactly
/// 10000 so `luma(v, v, v) == v`.
///
/// # Example
/// ```
/// use gs_core::frame::luma;
/// assert_eq!(luma(255, 255, 255), 255);
/// assert_eq!(luma(255, 0, 0), 54);
/// ```
#[inline(always)]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 2126 + u32::from(g) * 7152 + u32::from(b) * 722) / 10000) as u8
}

/// Allocate a zero-filled vector, reporting allocation failure instead of aborting.
///
/// # Errors
/// Returns `CoreError::OutOfMemory` if the allocator refuses the request.
pub fn try_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>, CoreError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CoreError::OutOfMemory {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    data.resize(len, T::default());
    Ok(data)
}

/// Buffer de pixels plat, row-major, sans padding de ligne.
///
/// Invariant: `data.len() == width * height * channels`. The pipeline mutates
/// `data` in place and never changes its length.
///
/// # Example
/// ```
/// use gs_core::frame::{Channels, PixelBuffer};
/// let fb = PixelBuffer::new(10, 10, Channels::Rgba).unwrap();
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Samples, row-major, `channels` bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Sample layout.
    pub channels: Channels,
}

impl PixelBuffer {
    /// Crée un buffer rempli de zéros aux dimensions données.
    ///
    /// # Errors
    /// `InvalidDimensions` for a zero or overflowing size, `OutOfMemory` if the
    /// samples cannot be allocated.
    ///
    /// # Example
    /// ```
    /// use gs_core::frame::{Channels, PixelBuffer};
    /// let fb = PixelBuffer::new(100, 50, Channels::Gray).unwrap();
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.data.len(), 100 * 50);
    /// ```
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self, CoreError> {
        let len = Self::byte_len(width, height, channels)?;
        Ok(Self {
            data: try_zeroed(len)?,
            width,
            height,
            channels,
        })
    }

    /// Wrap decoded samples, checking the length invariant.
    ///
    /// # Errors
    /// `InvalidDimensions` for a zero size, `BufferLength` if `data` is the wrong length.
    ///
    /// # Example
    /// ```
    /// use gs_core::frame::{Channels, PixelBuffer};
    /// assert!(PixelBuffer::from_raw(vec![0; 12], 2, 2, Channels::Gray).is_err());
    /// assert!(PixelBuffer::from_raw(vec![0; 4], 2, 2, Channels::Gray).is_ok());
    /// ```
    pub fn from_raw(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: Channels,
    ) -> Result<Self, CoreError> {
        let expected = Self::byte_len(width, height, channels)?;
        if data.len() != expected {
            return Err(CoreError::BufferLength {
                width,
                height,
                channels: channels.count(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    fn byte_len(width: u32, height: u32, channels: Channels) -> Result<usize, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels.count()))
            .ok_or(CoreError::InvalidDimensions { width, height })
    }

    /// Fallible deep copy, used for the pipeline's temporaries.
    ///
    /// # Errors
    /// Returns `CoreError::OutOfMemory` if the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, CoreError> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len())
            .map_err(|_| CoreError::OutOfMemory {
                bytes: self.data.len(),
            })?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            data,
            width: self.width,
            height: self.height,
            channels: self.channels,
        })
    }

    /// Bytes per row.
    #[inline(always)]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels.count()
    }

    /// (width, height) pair.
    #[inline(always)]
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Index of the first sample of pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        (y as usize * self.width as usize + x as usize) * self.channels.count()
    }

    /// Brightness of pixel (x, y): the sample itself for gray, BT.709 luma for RGBA.
    ///
    /// # Example
    /// ```
    /// use gs_core::frame::{Channels, PixelBuffer};
    /// let fb = PixelBuffer::from_raw(vec![0, 0, 255, 255], 1, 1, Channels::Rgba).unwrap();
    /// assert_eq!(fb.luma_at(0, 0), 18);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luma_at(&self, x: u32, y: u32) -> u8 {
        let idx = self.pixel_index(x, y);
        match self.channels {
            Channels::Gray => self.data[idx],
            Channels::Rgba => luma(self.data[idx], self.data[idx + 1], self.data[idx + 2]),
        }
    }

    /// Single-channel luma copy of this buffer.
    ///
    /// # Errors
    /// Returns `CoreError::OutOfMemory` if the copy cannot be allocated.
    pub fn extract_luma(&self) -> Result<Self, CoreError> {
        if self.channels == Channels::Gray {
            return self.try_clone();
        }
        let mut out = Self::new(self.width, self.height, Channels::Gray)?;
        for (dst, px) in out
            .data
            .iter_mut()
            .zip(self.data.chunks_exact(self.channels.count()))
        {
            *dst = luma(px[0], px[1], px[2]);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 4, Channels::Gray),
            Err(CoreError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn from_raw_reports_expected_length() {
        let err = PixelBuffer::from_raw(vec![0; 10], 2, 2, Channels::Rgba).unwrap_err();
        match err {
            CoreError::BufferLength {
                expected, actual, ..
            } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn luma_of_equal_channels_is_identity() {
        for v in 0..=255u8 {
            assert_eq!(luma(v, v, v), v);
        }
    }

    #[test]
    fn extract_luma_keeps_dimensions() {
        let fb = PixelBuffer::from_raw(
            vec![255, 255, 255, 0, 0, 255, 0, 255],
            2,
            1,
            Channels::Rgba,
        )
        .unwrap();
        let gray = fb.extract_luma().unwrap();
        assert_eq!(gray.channels, Channels::Gray);
        assert_eq!(gray.data, vec![255, 182]);
    }

    #[test]
    fn pixel_index_accounts_for_channels() {
        let fb = PixelBuffer::new(3, 2, Channels::Rgba).unwrap();
        assert_eq!(fb.pixel_index(2, 1), (3 + 2) * 4);
        assert_eq!(fb.stride(), 12);
    }
}
