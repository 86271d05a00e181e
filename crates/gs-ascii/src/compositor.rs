use anyhow::Result;
use gs_core::config::ColorSource;
use gs_core::error::CoreError;
use gs_core::frame::{Channels, PixelBuffer};
use gs_core::glyph::{BrightnessGlyph, EdgeGlyph, GLYPH_SIZE, Glyph, grayscale_to_glyph};
use rayon::prelude::*;

use crate::edge::EdgeMap;

/// Glyph chosen for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellGlyph {
    /// Picked from the cell's representative brightness.
    Brightness(BrightnessGlyph),
    /// Picked from the gradient direction of an edge cell.
    Edge(EdgeGlyph),
}

impl CellGlyph {
    /// Fixed bitmap of the chosen glyph.
    #[inline(always)]
    #[must_use]
    pub fn glyph(self) -> &'static Glyph {
        match self {
            Self::Brightness(g) => g.glyph(),
            Self::Edge(g) => g.glyph(),
        }
    }
}

/// Per-run glyph usage counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellStats {
    /// Cells composited, partial border cells included.
    pub cells: usize,
    /// Cells drawn with a directional glyph.
    pub edge_cells: usize,
    /// Uses of each brightness glyph, indexed by `BrightnessGlyph::index`.
    pub brightness: [usize; BrightnessGlyph::COUNT],
    /// Uses of each edge glyph, indexed by `EdgeGlyph::index`.
    pub edges: [usize; EdgeGlyph::COUNT],
}

impl CellStats {
    fn record(&mut self, choice: CellGlyph) {
        self.cells += 1;
        match choice {
            CellGlyph::Brightness(g) => self.brightness[g.index()] += 1,
            CellGlyph::Edge(g) => {
                self.edge_cells += 1;
                self.edges[g.index()] += 1;
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.cells += other.cells;
        self.edge_cells += other.edge_cells;
        for (a, b) in self.brightness.iter_mut().zip(other.brightness) {
            *a += b;
        }
        for (a, b) in self.edges.iter_mut().zip(other.edges) {
            *a += b;
        }
        self
    }
}

/// Compositor remplace chaque cellule 8×8 par le bitmap d'un glyphe.
///
/// # Example
/// ```
/// use gs_core::config::ColorSource;
/// use gs_core::frame::{Channels, PixelBuffer};
/// use gs_ascii::compositor::Compositor;
///
/// let mut fb = PixelBuffer::from_raw(vec![255; 64], 8, 8, Channels::Gray).unwrap();
/// let reference = fb.clone();
/// let stats = Compositor::new(ColorSource::White).composite(&mut fb, &reference, None).unwrap();
/// assert_eq!(stats.cells, 1);
/// assert_eq!(fb.data[0], 0);
/// assert_eq!(fb.data[9], 255);
/// ```
pub struct Compositor {
    color: ColorSource,
    parallel: bool,
}

impl Compositor {
    /// Create a parallel compositor painting with `color`.
    #[must_use]
    pub fn new(color: ColorSource) -> Self {
        Self {
            color,
            parallel: true,
        }
    }

    /// Toggle rayon band parallelism.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Pick the glyph for the cell whose top-left pixel is (x, y).
    ///
    /// An edge at that pixel wins; otherwise the reference brightness there
    /// selects a brightness glyph.
    #[inline(always)]
    #[must_use]
    pub fn select(reference: &PixelBuffer, edges: Option<&EdgeMap>, x: u32, y: u32) -> CellGlyph {
        match edges.and_then(|map| map.glyph_at(x, y)) {
            Some(edge) => CellGlyph::Edge(edge),
            None => CellGlyph::Brightness(grayscale_to_glyph(reference.luma_at(x, y))),
        }
    }

    /// Overwrite every cell of `buffer` with its glyph.
    ///
    /// `reference` supplies brightness and `edges` the optional directional
    /// override; both must match `buffer`'s dimensions. Cells crossing the
    /// right or bottom border are clipped. Bands of 8 rows are disjoint, so
    /// they are painted concurrently when parallelism is on.
    ///
    /// # Errors
    /// `CoreError::DimensionMismatch` if `reference` or `edges` differ in size.
    pub fn composite(
        &self,
        buffer: &mut PixelBuffer,
        reference: &PixelBuffer,
        edges: Option<&EdgeMap>,
    ) -> Result<CellStats> {
        let expected = buffer.dimensions();
        if reference.dimensions() != expected {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: reference.dimensions(),
            }
            .into());
        }
        if let Some(map) = edges
            && map.dimensions() != expected
        {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: map.dimensions(),
            }
            .into());
        }

        let stride = buffer.stride();
        let band_size = stride * GLYPH_SIZE;
        let layout = BandLayout {
            width: buffer.width,
            channels: buffer.channels,
            stride,
        };

        let paint = |(band_idx, band): (usize, &mut [u8])| {
            self.composite_band(band, (band_idx * GLYPH_SIZE) as u32, &layout, reference, edges)
        };

        let stats = if self.parallel {
            buffer
                .data
                .par_chunks_mut(band_size)
                .enumerate()
                .map(paint)
                .reduce(CellStats::default, CellStats::merge)
        } else {
            buffer
                .data
                .chunks_mut(band_size)
                .enumerate()
                .map(paint)
                .fold(CellStats::default(), CellStats::merge)
        };
        Ok(stats)
    }

    /// Paint one band of up to 8 rows starting at image row `y0`.
    fn composite_band(
        &self,
        band: &mut [u8],
        y0: u32,
        layout: &BandLayout,
        reference: &PixelBuffer,
        edges: Option<&EdgeMap>,
    ) -> CellStats {
        let ch = layout.channels.count();
        let rows = band.len() / layout.stride;
        let mut stats = CellStats::default();

        for x0 in (0..layout.width).step_by(GLYPH_SIZE) {
            let choice = Self::select(reference, edges, x0, y0);
            stats.record(choice);
            let glyph = choice.glyph();
            let cols = GLYPH_SIZE.min((layout.width - x0) as usize);

            for y_off in 0..rows {
                let row_start = y_off * layout.stride + x0 as usize * ch;
                let row = &mut band[row_start..row_start + cols * ch];
                for (x_off, px) in row.chunks_exact_mut(ch).enumerate() {
                    paint_pixel(px, glyph.bit(x_off, y_off), self.color);
                }
            }
        }
        stats
    }
}

struct BandLayout {
    width: u32,
    channels: Channels,
    stride: usize,
}

/// Write `sample_color * bit` into one pixel.
#[inline(always)]
fn paint_pixel(px: &mut [u8], bit: u8, color: ColorSource) {
    match (color, px.len()) {
        (ColorSource::White, _) => px.fill(255 * bit),
        (ColorSource::Fixed(rgba), 1) => px[0] = rgba.luma() * bit,
        (ColorSource::Fixed(rgba), _) => px.copy_from_slice(&rgba.to_array().map(|c| c * bit)),
        (ColorSource::Image, 1) => px[0] *= bit,
        (ColorSource::Image, _) => {
            for c in &mut px[..3] {
                *c *= bit;
            }
        }
    }
}
