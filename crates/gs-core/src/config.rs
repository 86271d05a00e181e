use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::CoreError;

/// Default Sobel magnitude threshold.
pub const DEFAULT_EDGE_THRESHOLD: u8 = 64;

/// Default block size for the downsampler (one glyph cell).
pub const DEFAULT_DOWNSCALE_FACTOR: u32 = 8;

/// Largest accepted downscale factor.
pub const MAX_DOWNSCALE_FACTOR: u32 = 256;

/// Configuration complète d'une passe de conversion.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use gs_core::config::PipelineConfig;
/// let config = PipelineConfig::default();
/// assert_eq!(config.edge_threshold, 64);
/// assert!(config.validate().is_ok());
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    // === Contours ===
    /// Substitute directional glyphs on strong gradients.
    pub edge_aware: bool,
    /// Sobel magnitude at or above which a pixel is an edge.
    pub edge_threshold: u8,

    // === Référence de luminance ===
    /// Blur the reference with a shrink/grow resize before sampling.
    pub downsample: bool,
    /// Block size of the shrink pass, `1..=256`.
    pub downscale_factor: u32,
    /// Reduce the reference to BT.709 luma before downsampling.
    pub grayscale: bool,
    /// Resize filter for both passes.
    pub filter: ResampleFilter,

    // === Couleur ===
    /// Where drawn pixels take their color from.
    pub color: ColorSource,

    // === Performance ===
    /// Composite cell bands on the rayon pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            edge_aware: true,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            downsample: true,
            downscale_factor: DEFAULT_DOWNSCALE_FACTOR,
            grayscale: true,
            filter: ResampleFilter::Box,
            color: ColorSource::White,
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Reject out-of-range values instead of truncating them.
    ///
    /// # Errors
    /// Returns `CoreError::Config` naming the offending field.
    ///
    /// # Example
    /// ```
    /// use gs_core::config::PipelineConfig;
    /// let config = PipelineConfig { downscale_factor: 0, ..PipelineConfig::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=MAX_DOWNSCALE_FACTOR).contains(&self.downscale_factor) {
            return Err(CoreError::Config(format!(
                "downscale_factor must be in 1..={MAX_DOWNSCALE_FACTOR}, got {}",
                self.downscale_factor
            )));
        }
        Ok(())
    }
}

/// Source de couleur des pixels allumés d'un glyphe.
///
/// Parsed from `"white"`, `"image"` or an `RRGGBBAA` hex string.
///
/// # Example
/// ```
/// use gs_core::config::ColorSource;
/// use gs_core::color::Rgba;
/// assert_eq!("image".parse::<ColorSource>().unwrap(), ColorSource::Image);
/// assert_eq!("000000FF".parse::<ColorSource>().unwrap(), ColorSource::Fixed(Rgba(0, 0, 0, 255)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorSource {
    /// Opaque white; all channels, alpha included, are scaled by the glyph bit.
    #[default]
    White,
    /// A user color; all four channels are scaled by the glyph bit.
    Fixed(Rgba),
    /// The pixel's own color; RGB scaled by the bit, alpha preserved.
    Image,
}

impl FromStr for ColorSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "image" => Ok(Self::Image),
            _ => Rgba::from_hex(s).map(Self::Fixed),
        }
    }
}

impl TryFrom<String> for ColorSource {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorSource> for String {
    fn from(value: ColorSource) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ColorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("white"),
            Self::Image => f.write_str("image"),
            Self::Fixed(rgba) => write!(f, "{rgba}"),
        }
    }
}

/// Resize filter used by the block downsampler.
///
/// # Example
/// ```
/// use gs_core::config::ResampleFilter;
/// assert_eq!("lanczos3".parse::<ResampleFilter>().unwrap(), ResampleFilter::Lanczos3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    /// Area average; each cell's top-left sample equals the block mean.
    #[default]
    Box,
    /// Triangle filter.
    Bilinear,
    /// Catmull-Rom cubic.
    CatmullRom,
    /// Mitchell–Netravali cubic.
    Mitchell,
    /// Lanczos, a = 3.
    Lanczos3,
}

impl FromStr for ResampleFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "box" => Ok(Self::Box),
            "bilinear" => Ok(Self::Bilinear),
            "catmullrom" | "catmull-rom" => Ok(Self::CatmullRom),
            "mitchell" => Ok(Self::Mitchell),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            _ => Err(CoreError::Config(format!(
                "unknown filter '{s}' (box, bilinear, catmullrom, mitchell, lanczos3)"
            ))),
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    pipeline: Option<PipelineSection>,
}

/// Pipeline section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct PipelineSection {
    edge_aware: Option<bool>,
    edge_threshold: Option<u8>,
    downsample: Option<bool>,
    downscale_factor: Option<u32>,
    grayscale: Option<bool>,
    filter: Option<ResampleFilter>,
    color: Option<ColorSource>,
    parallel: Option<bool>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema or if the
/// merged configuration fails `validate`.
///
/// # Example
/// ```
/// use gs_core::config::parse_config;
/// let config = parse_config("[pipeline]\nedge_threshold = 80\ncolor = \"image\"").unwrap();
/// assert_eq!(config.edge_threshold, 80);
/// assert!(config.edge_aware);
/// ```
pub fn parse_config(content: &str) -> Result<PipelineConfig> {
    let file: ConfigFile = toml::from_str(content).context("TOML parse error")?;

    let mut config = PipelineConfig::default();

    if let Some(p) = file.pipeline {
        if let Some(v) = p.edge_aware {
            config.edge_aware = v;
        }
        if let Some(v) = p.edge_threshold {
            config.edge_threshold = v;
        }
        if let Some(v) = p.downsample {
            config.downsample = v;
        }
        if let Some(v) = p.downscale_factor {
            config.downscale_factor = v;
        }
        if let Some(v) = p.grayscale {
            config.grayscale = v;
        }
        if let Some(v) = p.filter {
            config.filter = v;
        }
        if let Some(v) = p.color {
            config.color = v;
        }
        if let Some(v) = p.parallel {
            config.parallel = v;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gs_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("glyphscii.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("Invalid config {}", path.display()))?;
    log::debug!("Config loaded from {}: {config:?}", path.display());
    Ok(config)
}
