use crate::frame::PixelBuffer;

/// Redimensionne un buffer vers un autre.
///
/// Implémenté par : `gs_source::resize::Resizer`. The block downsampler calls
/// it twice per run, once to shrink and once to grow back, so one
/// implementation must serve both directions.
///
/// # Example
/// ```
/// use gs_core::traits::Resample;
/// use gs_core::frame::PixelBuffer;
///
/// struct TopLeft;
/// impl Resample for TopLeft {
///     fn resample(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) -> anyhow::Result<()> {
///         let v = src.data[0];
///         dst.data.fill(v);
///         Ok(())
///     }
/// }
/// ```
pub trait Resample {
    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// CONTRAT : `src` and `dst` share the same channel layout, and `dst.data`
    /// keeps its length.
    ///
    /// # Errors
    /// Returns an error if the underlying resize fails.
    fn resample(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) -> anyhow::Result<()>;
}
