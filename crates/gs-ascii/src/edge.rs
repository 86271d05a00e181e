use anyhow::Result;
use gs_core::error::CoreError;
use gs_core::frame::{PixelBuffer, try_zeroed};
use gs_core::glyph::{EdgeGlyph, angle_to_edge_glyph};
use rayon::prelude::*;

/// Sobel kernel, indexed `[dx][dy]` for `gx` and `[dy][dx]` for `gy`.
///
/// With that indexing `gx` measures change along y, so an angle of 0 is a
/// horizontal line and `angle_to_edge_glyph` draws it as `_`.
const SOBEL: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Binary edge mask plus gradient direction, one entry per source pixel.
///
/// Border pixels (first/last row and column) are never edges and carry an
/// angle of 0.
pub struct EdgeMap {
    mask: Vec<u8>,
    angles: Vec<f64>,
    width: u32,
    height: u32,
}

impl EdgeMap {
    /// (width, height) pair.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True if pixel (x, y) passed the threshold.
    #[inline(always)]
    #[must_use]
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.mask[self.index(x, y)] != 0
    }

    /// Gradient direction at (x, y), radians in (−π, π].
    #[inline(always)]
    #[must_use]
    pub fn angle(&self, x: u32, y: u32) -> f64 {
        self.angles[self.index(x, y)]
    }

    /// Directional glyph for (x, y), `None` when it is not an edge.
    #[inline(always)]
    #[must_use]
    pub fn glyph_at(&self, x: u32, y: u32) -> Option<EdgeGlyph> {
        self.is_edge(x, y)
            .then(|| angle_to_edge_glyph(self.angle(x, y)))
    }

    /// Number of edge pixels.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m != 0).count()
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Convolve `pixels` (one byte per pixel) with the 3×3 Sobel pair.
///
/// Interior pixels receive `round(sqrt(gx² + gy²))` clamped to 255 and
/// `angles` receives `atan2(gy, gx)`. Border pixels are left as they were.
/// Rows are processed on the rayon pool against an unfiltered copy.
///
/// # Errors
/// `InvalidDimensions` if the slices disagree with `width × height`,
/// `OutOfMemory` if the unfiltered copy cannot be allocated.
///
/// # Example
/// ```
/// use gs_ascii::edge::sobel;
///
/// // Dark top row, bright rows below: change along y.
/// let mut px = vec![0, 0, 0, 255, 255, 255, 255, 255, 255];
/// let mut angles = vec![0.0; 9];
/// sobel(&mut px, &mut angles, 3, 3).unwrap();
/// assert_eq!(px[4], 255);
/// assert_eq!(angles[4], 0.0);
/// ```
pub fn sobel(pixels: &mut [u8], angles: &mut [f64], width: usize, height: usize) -> Result<()> {
    let len = width * height;
    if pixels.len() != len || angles.len() != len {
        return Err(CoreError::InvalidDimensions {
            width: width as u32,
            height: height as u32,
        }
        .into());
    }
    if width < 3 || height < 3 {
        return Ok(());
    }

    let mut unfiltered = try_zeroed::<u8>(len)?;
    unfiltered.copy_from_slice(pixels);
    let unfiltered = &unfiltered;

    pixels
        .par_chunks_mut(width)
        .zip(angles.par_chunks_mut(width))
        .enumerate()
        .skip(1)
        .take(height - 2)
        .for_each(|(y, (row, angle_row))| {
            for x in 1..width - 1 {
                let mut gx = 0i32;
                let mut gy = 0i32;
                for (i, kernel_row) in SOBEL.iter().enumerate() {
                    for (j, &k) in kernel_row.iter().enumerate() {
                        let p = i32::from(unfiltered[(y + j - 1) * width + x + i - 1]);
                        gx += p * k;
                        gy += p * SOBEL[j][i];
                    }
                }
                let magnitude = f64::from(gx * gx + gy * gy).sqrt().round().min(255.0);
                row[x] = magnitude as u8;
                angle_row[x] = f64::from(gy).atan2(f64::from(gx));
            }
        });

    Ok(())
}

/// Run Sobel on the luma of `reference` and binarize against `threshold`.
///
/// # Errors
/// `OutOfMemory` if a working buffer cannot be allocated.
///
/// # Example
/// ```
/// use gs_core::frame::{Channels, PixelBuffer};
/// use gs_ascii::edge::detect_edges;
///
/// let flat = PixelBuffer::from_raw(vec![120; 64], 8, 8, Channels::Gray).unwrap();
/// let edges = detect_edges(&flat, 64).unwrap();
/// assert_eq!(edges.edge_count(), 0);
/// ```
pub fn detect_edges(reference: &PixelBuffer, threshold: u8) -> Result<EdgeMap> {
    let (width, height) = reference.dimensions();
    let (w, h) = (width as usize, height as usize);

    let mut magnitude = reference.extract_luma()?.data;
    let mut angles = try_zeroed::<f64>(w * h)?;
    sobel(&mut magnitude, &mut angles, w, h)?;

    // Borders still hold raw brightness: never let them through.
    let mut mask = magnitude;
    for (i, m) in mask.iter_mut().enumerate() {
        let (x, y) = (i % w, i / w);
        let interior = x > 0 && y > 0 && x + 1 < w && y + 1 < h;
        *m = u8::from(interior && *m >= threshold);
        if !interior {
            angles[i] = 0.0;
        }
    }

    let edges = EdgeMap {
        mask,
        angles,
        width,
        height,
    };
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "Edge detection: {} edge pixel(s) at threshold {threshold}",
            edges.edge_count()
        );
    }
    Ok(edges)
}
