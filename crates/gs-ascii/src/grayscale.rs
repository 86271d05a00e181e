use gs_core::frame::{PixelBuffer, luma};

/// Replace R, G and B of every pixel by its BT.709 luma, alpha untouched.
///
/// No-op for buffers with fewer than three channels.
///
/// # Example
/// ```
/// use gs_core::frame::{Channels, PixelBuffer};
/// use gs_ascii::grayscale::reduce_to_luma;
///
/// let mut fb = PixelBuffer::from_raw(vec![255, 0, 0, 77], 1, 1, Channels::Rgba).unwrap();
/// reduce_to_luma(&mut fb);
/// assert_eq!(fb.data, vec![54, 54, 54, 77]);
/// ```
pub fn reduce_to_luma(buffer: &mut PixelBuffer) {
    let channels = buffer.channels.count();
    if channels < 3 {
        return;
    }
    for px in buffer.data.chunks_exact_mut(channels) {
        let gray = luma(px[0], px[1], px[2]);
        px[..3].fill(gray);
    }
}

#[cfg(test)]
mod tests {
    use gs_core::frame::Channels;

    use super::*;

    #[test]
    fn every_pixel_ends_gray() {
        let data: Vec<u8> = (0..64u32)
            .flat_map(|i| {
                [
                    (i * 37 % 256) as u8,
                    (i * 91 % 256) as u8,
                    (i * 13 % 256) as u8,
                    (i * 5) as u8,
                ]
            })
            .collect();
        let alphas: Vec<u8> = data.chunks_exact(4).map(|p| p[3]).collect();
        let mut fb = PixelBuffer::from_raw(data, 8, 8, Channels::Rgba).unwrap();

        reduce_to_luma(&mut fb);

        for (px, alpha) in fb.data.chunks_exact(4).zip(alphas) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], alpha);
        }
    }

    #[test]
    fn single_channel_is_untouched() {
        let mut fb = PixelBuffer::from_raw(vec![1, 2, 3, 4], 2, 2, Channels::Gray).unwrap();
        reduce_to_luma(&mut fb);
        assert_eq!(fb.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn green_weighs_most() {
        let mut fb =
            PixelBuffer::from_raw(vec![0, 255, 0, 255, 0, 0, 255, 255], 2, 1, Channels::Rgba)
                .unwrap();
        reduce_to_luma(&mut fb);
        assert_eq!(fb.data[0], 182);
        assert_eq!(fb.data[4], 18);
    }
}
