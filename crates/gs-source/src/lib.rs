/// Image I/O and resampling collaborators for glyphscii.
///
/// Decoding, PNG encoding and the gamma-correct resize used by the block
/// downsampler. The transform itself lives in `gs-ascii`.

pub mod image;
pub mod resize;
