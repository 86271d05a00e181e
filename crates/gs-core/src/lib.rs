/// Configuration, types, and shared structures for glyphscii.
///
/// This crate holds the pixel buffer, the fixed 8×8 glyph tables, the
/// pipeline configuration and the `Resample` seam used across the workspace.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod glyph;
pub mod traits;

pub use color::Rgba;
pub use config::{ColorSource, PipelineConfig, ResampleFilter};
pub use error::CoreError;
pub use frame::{Channels, PixelBuffer};
pub use glyph::{BrightnessGlyph, EdgeGlyph, GLYPH_SIZE, Glyph};
pub use traits::Resample;
