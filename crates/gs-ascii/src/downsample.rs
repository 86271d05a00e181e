use anyhow::{Context, Result};
use gs_core::error::CoreError;
use gs_core::frame::PixelBuffer;
use gs_core::traits::Resample;

/// Blur `buffer` in place to block averages of size `factor`.
///
/// Shrinks to `⌊w/factor⌋ × ⌊h/factor⌋` (at least 1×1) and grows back to
/// `w × h` with the same resampler. Afterwards the top-left pixel of each
/// `factor`-aligned block stands for the block's average brightness.
///
/// # Errors
/// `CoreError::Config` for a zero factor, `CoreError::OutOfMemory` if the
/// shrunk buffer cannot be allocated, or any resampler failure.
///
/// # Example
/// ```
/// use gs_core::config::ResampleFilter;
/// use gs_core::frame::{Channels, PixelBuffer};
/// use gs_ascii::downsample::block_downsample;
/// use gs_source::resize::Resizer;
///
/// let mut fb = PixelBuffer::from_raw(vec![90; 256], 16, 16, Channels::Gray).unwrap();
/// block_downsample(&mut fb, 8, &mut Resizer::new(ResampleFilter::Box)).unwrap();
/// assert!(fb.data.iter().all(|&v| v == 90));
/// ```
pub fn block_downsample<R: Resample + ?Sized>(
    buffer: &mut PixelBuffer,
    factor: u32,
    resampler: &mut R,
) -> Result<()> {
    if factor == 0 {
        return Err(CoreError::Config("downscale factor must be at least 1".into()).into());
    }
    if factor == 1 {
        return Ok(());
    }

    let (width, height) = buffer.dimensions();
    if width < factor || height < factor {
        log::warn!(
            "Image {width}×{height} is smaller than one {factor}px block; collapsing that axis to a single sample"
        );
    }
    let shrunk_w = (width / factor).max(1);
    let shrunk_h = (height / factor).max(1);

    let mut shrunk = PixelBuffer::new(shrunk_w, shrunk_h, buffer.channels)?;
    resampler
        .resample(buffer, &mut shrunk)
        .with_context(|| format!("Shrink pass to {shrunk_w}×{shrunk_h} failed"))?;
    resampler
        .resample(&shrunk, buffer)
        .with_context(|| format!("Grow pass back to {width}×{height} failed"))?;

    log::debug!("Block downsample: {width}×{height} -> {shrunk_w}×{shrunk_h} -> {width}×{height}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use gs_core::config::ResampleFilter;
    use gs_core::frame::Channels;
    use gs_source::resize::Resizer;

    use super::*;

    /// Records the sizes it was asked for, copies the first sample everywhere.
    #[derive(Default)]
    struct Recording {
        calls: Vec<((u32, u32), (u32, u32))>,
    }

    impl Resample for Recording {
        fn resample(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<()> {
            self.calls.push((src.dimensions(), dst.dimensions()));
            let v = src.data[0];
            dst.data.fill(v);
            Ok(())
        }
    }

    #[test]
    fn shrinks_by_factor_then_restores_size() {
        let mut fb = PixelBuffer::new(20, 17, Channels::Gray).unwrap();
        let mut rec = Recording::default();
        block_downsample(&mut fb, 8, &mut rec).unwrap();
        assert_eq!(rec.calls, vec![((20, 17), (2, 2)), ((2, 2), (20, 17))]);
        assert_eq!(fb.data.len(), 20 * 17);
    }

    #[test]
    fn tiny_image_collapses_to_one_sample() {
        let mut fb = PixelBuffer::new(5, 3, Channels::Rgba).unwrap();
        let mut rec = Recording::default();
        block_downsample(&mut fb, 8, &mut rec).unwrap();
        assert_eq!(rec.calls[0].1, (1, 1));
    }

    #[test]
    fn zero_factor_is_rejected() {
        let mut fb = PixelBuffer::new(8, 8, Channels::Gray).unwrap();
        let err = block_downsample(&mut fb, 0, &mut Recording::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Config(_))
        ));
    }

    #[test]
    fn factor_one_leaves_buffer_alone() {
        let mut fb = PixelBuffer::from_raw(vec![1, 2, 3, 4], 2, 2, Channels::Gray).unwrap();
        let mut rec = Recording::default();
        block_downsample(&mut fb, 1, &mut rec).unwrap();
        assert!(rec.calls.is_empty());
        assert_eq!(fb.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn uniform_buffers_are_fixed_points() {
        let mut resizer = Resizer::new(ResampleFilter::Box);
        for (w, h) in [(16, 16), (20, 20), (33, 9), (7, 7)] {
            for value in [0u8, 64, 200, 255] {
                let mut fb = PixelBuffer::from_raw(
                    vec![value; (w * h) as usize],
                    w,
                    h,
                    Channels::Gray,
                )
                .unwrap();
                block_downsample(&mut fb, 8, &mut resizer).unwrap();
                assert!(
                    fb.data.iter().all(|&v| v == value),
                    "{w}×{h} uniform {value} changed"
                );
            }
        }
    }

    #[test]
    fn box_blur_puts_block_mean_at_cell_origin() {
        // Left 8×8 block black, right block white.
        let mut data = vec![0u8; 16 * 8];
        for row in data.chunks_exact_mut(16) {
            row[8..].fill(255);
        }
        let mut fb = PixelBuffer::from_raw(data, 16, 8, Channels::Gray).unwrap();
        block_downsample(
            &mut fb,
            8,
            &mut Resizer::new(ResampleFilter::Box).without_gamma_correction(),
        )
        .unwrap();
        assert_eq!(fb.luma_at(0, 0), 0);
        assert_eq!(fb.luma_at(8, 0), 255);
    }
}
