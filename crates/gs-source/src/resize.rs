use anyhow::{Context, Result, ensure};
use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{
    FilterType, PixelComponentMapper, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer,
    create_srgb_mapper,
};
use gs_core::config::ResampleFilter;
use gs_core::frame::{Channels, PixelBuffer, try_zeroed};
use gs_core::traits::Resample;

/// Resizer réutilisable wrappant fast_image_resize.
///
/// By default samples are mapped from sRGB to 16-bit linear light before the
/// convolution and mapped back afterwards, so averages are gamma-correct.
/// RGBA channels are resized independently, without premultiplying by alpha,
/// so a transparent pixel keeps its color.
///
/// # Example
/// ```
/// use gs_core::config::ResampleFilter;
/// use gs_source::resize::Resizer;
/// let r = Resizer::new(ResampleFilter::Box);
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    srgb: PixelComponentMapper,
    gamma_correct: bool,
}

impl Resizer {
    /// Create a gamma-correct resizer using `filter` for every pass.
    #[must_use]
    pub fn new(filter: ResampleFilter) -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new()
                .resize_alg(ResizeAlg::Convolution(filter_type(filter)))
                .use_alpha(false),
            srgb: create_srgb_mapper(),
            gamma_correct: true,
        }
    }

    /// Resize directly on the 8-bit sRGB samples, without the linear-light round trip.
    #[must_use]
    pub fn without_gamma_correction(mut self) -> Self {
        self.gamma_correct = false;
        self
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if the layouts differ or the resize operation fails.
    ///
    /// # Example
    /// ```
    /// use gs_core::config::ResampleFilter;
    /// use gs_core::frame::{Channels, PixelBuffer};
    /// use gs_source::resize::Resizer;
    /// let mut r = Resizer::new(ResampleFilter::Box);
    /// let src = PixelBuffer::new(100, 100, Channels::Gray).unwrap();
    /// let mut dst = PixelBuffer::new(50, 50, Channels::Gray).unwrap();
    /// r.resize_into(&src, &mut dst).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<()> {
        ensure!(
            src.channels == dst.channels,
            "Resize between different layouts ({:?} -> {:?})",
            src.channels,
            dst.channels
        );
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        let (narrow, wide) = pixel_types(src.channels);
        let src_image = ImageRef::new(src.width, src.height, &src.data, narrow)
            .context("Invalid source dimensions")?;

        if !self.gamma_correct {
            let mut dst_image = Image::from_slice_u8(dst.width, dst.height, &mut dst.data, narrow)
                .context("Invalid destination dimensions")?;
            self.inner
                .resize(&src_image, &mut dst_image, Some(&self.options))
                .context("Resize failed")?;
            return Ok(());
        }

        let mut src_linear = linear_image(src.width, src.height, src.channels, wide)?;
        self.srgb
            .forward_map(&src_image, &mut src_linear)
            .context("sRGB to linear mapping failed")?;

        let mut dst_linear = linear_image(dst.width, dst.height, dst.channels, wide)?;
        self.inner
            .resize(&src_linear, &mut dst_linear, Some(&self.options))
            .context("Resize failed")?;

        let mut dst_image = Image::from_slice_u8(dst.width, dst.height, &mut dst.data, narrow)
            .context("Invalid destination dimensions")?;
        self.srgb
            .backward_map(&dst_linear, &mut dst_image)
            .context("Linear to sRGB mapping failed")?;

        Ok(())
    }
}

impl Resample for Resizer {
    fn resample(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<()> {
        self.resize_into(src, dst)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResampleFilter::default())
    }
}

/// 8-bit and 16-bit pixel types for a channel layout.
fn pixel_types(channels: Channels) -> (PixelType, PixelType) {
    match channels {
        Channels::Gray => (PixelType::U8, PixelType::U16),
        Channels::Rgba => (PixelType::U8x4, PixelType::U16x4),
    }
}

fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Box => FilterType::Box,
        ResampleFilter::Bilinear => FilterType::Bilinear,
        ResampleFilter::CatmullRom => FilterType::CatmullRom,
        ResampleFilter::Mitchell => FilterType::Mitchell,
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// 16-bit scratch image; allocation failure surfaces as `CoreError::OutOfMemory`.
fn linear_image(
    width: u32,
    height: u32,
    channels: Channels,
    pixel_type: PixelType,
) -> Result<Image<'static>> {
    let bytes = width as usize * height as usize * channels.count() * 2;
    let buffer = try_zeroed::<u8>(bytes)?;
    Image::from_vec_u8(width, height, buffer, pixel_type).context("Invalid scratch dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, channels: Channels, px: &[u8]) -> PixelBuffer {
        let data = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * channels.count())
            .collect();
        PixelBuffer::from_raw(data, width, height, channels).unwrap()
    }

    #[test]
    fn uniform_gray_survives_shrink_and_grow() {
        for filter in [
            ResampleFilter::Box,
            ResampleFilter::Bilinear,
            ResampleFilter::Lanczos3,
        ] {
            for value in [0u8, 37, 128, 255] {
                let mut r = Resizer::new(filter);
                let src = uniform(20, 13, Channels::Gray, &[value]);
                let mut small = PixelBuffer::new(2, 1, Channels::Gray).unwrap();
                r.resize_into(&src, &mut small).unwrap();
                let mut back = PixelBuffer::new(20, 13, Channels::Gray).unwrap();
                r.resize_into(&small, &mut back).unwrap();
                assert!(
                    back.data.iter().all(|&v| v == value),
                    "{filter:?} altered uniform {value}"
                );
            }
        }
    }

    #[test]
    fn uniform_rgba_survives_shrink_and_grow() {
        for px in [[200, 40, 90, 255], [200, 40, 90, 0], [1, 2, 3, 4], [255, 255, 255, 0]] {
            for (w, h) in [(16, 16), (20, 20)] {
                let mut r = Resizer::new(ResampleFilter::Box);
                let src = uniform(w, h, Channels::Rgba, &px);
                let mut small = PixelBuffer::new(w / 8, h / 8, Channels::Rgba).unwrap();
                r.resize_into(&src, &mut small).unwrap();
                let mut back = PixelBuffer::new(w, h, Channels::Rgba).unwrap();
                r.resize_into(&small, &mut back).unwrap();
                assert!(
                    back.data.chunks_exact(4).all(|p| p == px),
                    "{w}×{h} uniform {px:?} changed"
                );
            }
        }
    }

    #[test]
    fn box_shrink_averages_in_linear_light() {
        // Half black, half white: a gamma-correct mean is brighter than 128.
        let mut data = vec![0u8; 8];
        data[4..].fill(255);
        let src = PixelBuffer::from_raw(data, 8, 1, Channels::Gray).unwrap();
        let mut dst = PixelBuffer::new(1, 1, Channels::Gray).unwrap();

        Resizer::new(ResampleFilter::Box)
            .resize_into(&src, &mut dst)
            .unwrap();
        assert!(dst.data[0] > 180, "linear mean gave {}", dst.data[0]);

        Resizer::new(ResampleFilter::Box)
            .without_gamma_correction()
            .resize_into(&src, &mut dst)
            .unwrap();
        assert!((127..=128).contains(&dst.data[0]), "srgb mean gave {}", dst.data[0]);
    }

    #[test]
    fn mismatched_layouts_are_rejected() {
        let mut r = Resizer::default();
        let src = PixelBuffer::new(4, 4, Channels::Gray).unwrap();
        let mut dst = PixelBuffer::new(2, 2, Channels::Rgba).unwrap();
        assert!(r.resize_into(&src, &mut dst).is_err());
    }
}
