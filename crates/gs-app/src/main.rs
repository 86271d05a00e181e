use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use gs_ascii::pipeline::Pipeline;
use gs_core::config::{ColorSource, PipelineConfig};
use gs_core::error::CoreError;
use gs_core::frame::Channels;
use gs_source::resize::Resizer;

pub mod cli;

fn main() -> ExitCode {
    // 1. Parser CLI (clap sort en 2 par défaut, on veut 1)
    let cli = match cli::Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Convertir
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if is_fatal(&err) {
                log::error!("Fatal: {err:#}");
            }
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load, convert and write one image.
fn run(cli: &cli::Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let mut buffer = gs_source::image::load(&cli.input, input_channels(config.color))?;

    let mut resizer = Resizer::new(config.filter);
    let pipeline = Pipeline::new(config)?;
    let stats = pipeline.run(&mut buffer, &mut resizer)?;
    log::info!(
        "Converted {} cell(s), {} with edge glyphs",
        stats.cells,
        stats.edge_cells
    );

    gs_source::image::write_png(&cli.output, &buffer)
}

/// Defaults, then `--config`, then command-line flags.
fn resolve_config(cli: &cli::Cli) -> Result<PipelineConfig> {
    let mut config = match cli.config {
        Some(ref path) => gs_core::config::load_config(path)?,
        None => PipelineConfig::default(),
    };
    cli.apply_to(&mut config)?;
    log::debug!("Resolved config: {config:?}");
    Ok(config)
}

/// White output only needs luma; any other color source needs RGBA.
fn input_channels(color: ColorSource) -> Channels {
    match color {
        ColorSource::White => Channels::Gray,
        ColorSource::Fixed(_) | ColorSource::Image => Channels::Rgba,
    }
}

fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<CoreError>(),
            Some(CoreError::OutOfMemory { .. })
        )
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::Path;

    use gs_core::frame::PixelBuffer;

    use super::*;

    fn cli(args: &[&str]) -> cli::Cli {
        let argv = std::iter::once("glyphscii")
            .chain(args.iter().copied())
            .map(OsString::from);
        cli::Cli::try_parse_from(cli::normalize_args(argv)).unwrap()
    }

    fn write_input(path: &Path) {
        // Left half black, right half white, 24×16.
        let mut data = vec![0u8; 24 * 16 * 4];
        for (i, px) in data.chunks_exact_mut(4).enumerate() {
            let v = if i % 24 < 12 { 0 } else { 255 };
            px.copy_from_slice(&[v, v, v, 255]);
        }
        let buffer = PixelBuffer::from_raw(data, 24, 16, Channels::Rgba).unwrap();
        gs_source::image::write_png(path, &buffer).unwrap();
    }

    #[test]
    fn white_output_is_gray_and_same_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        write_input(&input);

        let args = [input.to_str().unwrap(), output.to_str().unwrap()];
        run(&cli(&args)).unwrap();

        let result = gs_source::image::load(&output, Channels::Rgba).unwrap();
        assert_eq!(result.dimensions(), (24, 16));
        // Gray PNG: every channel equal, fully opaque.
        assert!(
            result
                .data
                .chunks_exact(4)
                .all(|p| p[0] == p[1] && p[1] == p[2] && p[3] == 255)
        );
    }

    #[test]
    fn fixed_color_output_has_transparent_background() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        write_input(&input);

        let args = [
            "--with-color",
            "000000FF",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
        ];
        run(&cli(&args)).unwrap();

        let result = gs_source::image::load(&output, Channels::Rgba).unwrap();
        assert!(result.data.chunks_exact(4).any(|p| p == [0, 0, 0, 0]));
        assert!(
            result
                .data
                .chunks_exact(4)
                .all(|p| p == [0, 0, 0, 0] || p == [0, 0, 0, 255])
        );
    }

    #[test]
    fn config_file_is_overridden_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("glyphscii.toml");
        std::fs::write(
            &config_path,
            "[pipeline]\nedge_threshold = 99\nedge_aware = false\n",
        )
        .unwrap();

        let args = [
            "--config",
            config_path.to_str().unwrap(),
            "--edge-threshold",
            "7",
            "in.png",
            "out.png",
        ];
        let config = resolve_config(&cli(&args)).unwrap();
        assert_eq!(config.edge_threshold, 7);
        assert!(!config.edge_aware);
    }

    #[test]
    fn missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let args = ["/nonexistent/in.png", output.to_str().unwrap()];
        let err = run(&cli(&args)).unwrap_err();
        assert!(format!("{err:#}").contains("Could not open input image"));
        assert!(!is_fatal(&err));
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        write_input(&input);
        let output = dir.path().join("missing-dir").join("out.png");
        let args = [input.to_str().unwrap(), output.to_str().unwrap()];
        let err = run(&cli(&args)).unwrap_err();
        assert!(format!("{err:#}").contains("Could not save output image"));
    }

    #[test]
    fn channel_choice_follows_color_source() {
        assert_eq!(input_channels(ColorSource::White), Channels::Gray);
        assert_eq!(input_channels(ColorSource::Image), Channels::Rgba);
        assert_eq!(
            input_channels(ColorSource::Fixed(gs_core::color::Rgba::WHITE)),
            Channels::Rgba
        );
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let err = anyhow::Error::from(CoreError::OutOfMemory { bytes: 1 << 40 })
            .context("Brightness reference");
        assert!(is_fatal(&err));
    }
}
