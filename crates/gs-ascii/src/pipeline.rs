use anyhow::{Context, Result};
use gs_core::config::PipelineConfig;
use gs_core::frame::PixelBuffer;
use gs_core::glyph::{BrightnessGlyph, EdgeGlyph};
use gs_core::traits::Resample;

use crate::compositor::{CellStats, Compositor};
use crate::downsample::block_downsample;
use crate::edge::detect_edges;
use crate::grayscale::reduce_to_luma;

/// Pipeline complet : référence de luminance, contours, puis composition.
///
/// The caller's buffer is overwritten in place and keeps its size. The
/// brightness reference and the edge map are temporaries owned by `run` and
/// are fully built before compositing starts.
///
/// # Example
/// ```
/// use gs_core::config::PipelineConfig;
/// use gs_core::frame::{Channels, PixelBuffer};
/// use gs_ascii::pipeline::Pipeline;
/// use gs_source::resize::Resizer;
///
/// let config = PipelineConfig::default();
/// let mut resizer = Resizer::new(config.filter);
/// let pipeline = Pipeline::new(config).unwrap();
/// let mut fb = PixelBuffer::new(16, 16, Channels::Gray).unwrap();
/// let stats = pipeline.run(&mut fb, &mut resizer).unwrap();
/// assert_eq!(stats.cells, 4);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    compositor: Compositor,
}

impl Pipeline {
    /// Build a pipeline from a checked configuration.
    ///
    /// # Errors
    /// Returns an error if `config.validate()` fails.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let compositor = Compositor::new(config.color).parallel(config.parallel);
        Ok(Self { config, compositor })
    }

    /// Convert `buffer` to glyph art in place.
    ///
    /// # Errors
    /// Returns an error on allocation failure of a temporary or if the
    /// resampler fails. `buffer` is untouched unless compositing started.
    pub fn run<R: Resample + ?Sized>(
        &self,
        buffer: &mut PixelBuffer,
        resampler: &mut R,
    ) -> Result<CellStats> {
        let (width, height) = buffer.dimensions();
        log::info!(
            "Converting {width}×{height} ({} channel(s)), edges {}, color {}",
            buffer.channels.count(),
            if self.config.edge_aware { "on" } else { "off" },
            self.config.color
        );

        // Brightness reference, kept apart so image colors survive.
        let mut reference = buffer.try_clone().context("Brightness reference")?;
        if self.config.grayscale {
            reduce_to_luma(&mut reference);
        }
        if self.config.downsample {
            block_downsample(&mut reference, self.config.downscale_factor, resampler)?;
        }

        let edges = if self.config.edge_aware {
            Some(detect_edges(&reference, self.config.edge_threshold).context("Edge detection")?)
        } else {
            None
        };

        let stats = self
            .compositor
            .composite(buffer, &reference, edges.as_ref())?;
        log_stats(&stats);
        Ok(stats)
    }
}

fn log_stats(stats: &CellStats) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let histogram: String = BrightnessGlyph::ALL
        .iter()
        .map(|g| format!("'{}':{} ", g.as_char(), stats.brightness[g.index()]))
        .chain(
            EdgeGlyph::ALL
                .iter()
                .map(|g| format!("'{}':{} ", g.as_char(), stats.edges[g.index()])),
        )
        .collect();
    log::debug!(
        "{} cell(s), {} edge cell(s): {}",
        stats.cells,
        stats.edge_cells,
        histogram.trim_end()
    );
}
