use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use gs_core::color::Rgba;
use gs_core::config::{ColorSource, PipelineConfig, ResampleFilter};

/// Spelling accepted by older scripts, rewritten to `--edge-threshold`.
const LEGACY_EDGE_THRESHOLD: &str = "-edge_threshold";

/// glyphscii : convertit une image en mosaïque de glyphes ASCII 8×8.
#[derive(Parser, Debug)]
#[command(name = "glyphscii", version, about, long_about = None)]
pub struct Cli {
    /// Image d'entrée (PNG, JPEG, BMP, GIF). Le format est détecté au contenu.
    pub input: PathBuf,

    /// Image de sortie, toujours encodée en PNG.
    pub output: PathBuf,

    /// Seuil de magnitude Sobel (0-255) au-delà duquel un pixel est un contour.
    #[arg(long, value_name = "0-255")]
    pub edge_threshold: Option<u8>,

    /// Colorer les glyphes avec les couleurs de l'image source.
    #[arg(long, default_value_t = false, conflicts_with = "with_color")]
    pub with_img_colors: bool,

    /// Colorer les glyphes avec une couleur fixe RRGGBBAA (fond transparent).
    #[arg(long, value_name = "RRGGBBAA")]
    pub with_color: Option<Rgba>,

    /// Désactiver les glyphes directionnels.
    #[arg(long, default_value_t = false)]
    pub no_edges: bool,

    /// Échantillonner la luminance brute au lieu de la moyenne par bloc.
    #[arg(long, default_value_t = false)]
    pub no_downsample: bool,

    /// Taille de bloc du sous-échantillonnage (1-256).
    #[arg(long, value_name = "N")]
    pub downscale_factor: Option<u32>,

    /// Filtre de redimensionnement : box, bilinear, catmullrom, mitchell, lanczos3.
    #[arg(long)]
    pub filter: Option<ResampleFilter>,

    /// Composer les cellules sur un seul thread.
    #[arg(long, default_value_t = false)]
    pub single_thread: bool,

    /// Fichier de configuration TOML (table [pipeline]).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Apply flags given on the command line over `config`.
    ///
    /// # Errors
    /// Returns an error if the resulting configuration is out of range.
    pub fn apply_to(&self, config: &mut PipelineConfig) -> anyhow::Result<()> {
        if let Some(threshold) = self.edge_threshold {
            config.edge_threshold = threshold;
        }
        if self.with_img_colors {
            config.color = ColorSource::Image;
        }
        if let Some(rgba) = self.with_color {
            config.color = ColorSource::Fixed(rgba);
        }
        if self.no_edges {
            config.edge_aware = false;
        }
        if self.no_downsample {
            config.downsample = false;
        }
        if let Some(factor) = self.downscale_factor {
            config.downscale_factor = factor;
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if self.single_thread {
            config.parallel = false;
        }
        config.validate()?;
        Ok(())
    }
}

/// Rewrite legacy single-dash spellings so clap sees long options.
#[must_use]
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if s == LEGACY_EDGE_THRESHOLD => OsString::from("--edge-threshold"),
            Some(s) => match s
                .strip_prefix(LEGACY_EDGE_THRESHOLD)
                .and_then(|rest| rest.strip_prefix('='))
            {
                Some(value) => OsString::from(format!("--edge-threshold={value}")),
                None => arg,
            },
            None => arg,
        })
        .collect()
}
