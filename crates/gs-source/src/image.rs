use std::path::Path;

use anyhow::{Context, Result};
use gs_core::frame::{Channels, PixelBuffer};
use image::{ExtendedColorType, ImageFormat, ImageReader};

/// Décode une image depuis le disque vers la disposition demandée.
///
/// The format is sniffed from the file contents, not the extension; the pixels are
/// converted to 8-bit luma or 8-bit RGBA depending on `channels`.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use gs_core::frame::Channels;
/// use gs_source::image::load;
/// use std::path::Path;
/// let buffer = load(Path::new("photo.png"), Channels::Gray).unwrap();
/// ```
pub fn load(path: &Path, channels: Channels) -> Result<PixelBuffer> {
    let img = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .with_context(|| format!("Could not open input image {}", path.display()))?
        .decode()
        .with_context(|| format!("Could not load input image {}", path.display()))?;
    let (width, height, data) = match channels {
        Channels::Gray => {
            let gray = img.to_luma8();
            let (w, h) = gray.dimensions();
            (w, h, gray.into_raw())
        }
        Channels::Rgba => {
            let rgba = img.to_rgba8();
            let (w, h) = rgba.dimensions();
            (w, h, rgba.into_raw())
        }
    };
    log::info!(
        "Loaded {} ({width}×{height}, {} channel(s))",
        path.display(),
        channels.count()
    );
    PixelBuffer::from_raw(data, width, height, channels)
        .with_context(|| format!("Could not load input image {}", path.display()))
}

/// Encode le buffer en PNG, quelle que soit l'extension de `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or encoded.
///
/// # Example
/// ```no_run
/// use gs_core::frame::{Channels, PixelBuffer};
/// use gs_source::image::write_png;
/// use std::path::Path;
/// let buffer = PixelBuffer::new(16, 16, Channels::Gray).unwrap();
/// write_png(Path::new("out.png"), &buffer).unwrap();
/// ```
pub fn write_png(path: &Path, buffer: &PixelBuffer) -> Result<()> {
    let color = match buffer.channels {
        Channels::Gray => ExtendedColorType::L8,
        Channels::Rgba => ExtendedColorType::Rgba8,
    };
    image::save_buffer_with_format(
        path,
        &buffer.data,
        buffer.width,
        buffer.height,
        color,
        ImageFormat::Png,
    )
    .with_context(|| format!("Could not save output image {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_written_then_loaded_keeps_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        let data: Vec<u8> = (0..64u8).map(|v| v * 4).collect();
        let buffer = PixelBuffer::from_raw(data.clone(), 8, 8, Channels::Gray).unwrap();

        write_png(&path, &buffer).unwrap();
        let loaded = load(&path, Channels::Gray).unwrap();

        assert_eq!(loaded.dimensions(), (8, 8));
        assert_eq!(loaded.data, data);
    }

    #[test]
    fn gray_png_loads_as_opaque_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let buffer = PixelBuffer::from_raw(vec![10, 200], 2, 1, Channels::Gray).unwrap();
        write_png(&path, &buffer).unwrap();

        let rgba = load(&path, Channels::Rgba).unwrap();
        assert_eq!(rgba.data, vec![10, 10, 10, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn write_png_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let buffer = PixelBuffer::new(4, 4, Channels::Rgba).unwrap();
        write_png(&path, &buffer).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn missing_input_reports_path() {
        let err = load(Path::new("/nonexistent/input.png"), Channels::Gray).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Could not open input image"), "{msg}");
        assert!(msg.contains("input.png"), "{msg}");
    }
}
