/// ASCII conversion engine for glyphscii.
///
/// Converts a pixel buffer, in place, into a mosaic of 8×8 bitmap glyphs.
pub mod compositor;
pub mod downsample;
pub mod edge;
pub mod grayscale;
pub mod pipeline;

pub use compositor::{CellGlyph, CellStats, Compositor};
pub use edge::EdgeMap;
pub use pipeline::Pipeline;
