//! Configuration handling for the brickmap CLI
//!
//! Settings come from `brickmap.toml` (working directory, then the user
//! config directory) and are overridden by command-line flags.

use anyhow::{Context, Result};
use brickmap_core::query::quadrant::DEFAULT_MAX_DEPTH;
use brickmap_core::sampler::DEFAULT_SAMPLE_STRIDE;
use brickmap_core::{
    AverageSampler, BlockReducer, DistanceMetric, Palette, QueryLimits, Rgb, ToneFilter,
};
use brickmap_render::{DensityStyle, DEFAULT_DENSITY_MAX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};

pub const CONFIG_FILE_NAME: &str = "brickmap.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub tile: TileConfig,
    #[serde(default)]
    pub color: ColorConfig,
    #[serde(default)]
    pub tone: ToneFilter,
    #[serde(default)]
    pub density: DensityConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Worker threads for block reduction
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    /// Source tiles are resized to this square size before reduction
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Brick edge length in pixels
    #[serde(default = "default_block_size")]
    pub block_size: u32,

    /// Pixel stride used when averaging a block
    #[serde(default = "default_sample_stride")]
    pub sample_stride: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Brick palette as `[r, g, b]` triples; empty keeps the sampled colours
    #[serde(default)]
    pub palette: Vec<Rgb>,

    /// Palette distance, `linear` or `circular`
    #[serde(default)]
    pub metric: DistanceMetric,

    /// RGB contrast applied to the final block fill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityConfig {
    #[serde(default = "default_density_block_size")]
    pub block_size: u32,

    /// Count at which a block is drawn fully opaque
    #[serde(default = "default_max_value")]
    pub max_value: u32,

    #[serde(default = "default_density_color")]
    pub color: Rgb,

    /// Per-request feature cap of the point layer
    #[serde(default = "default_transfer_limit")]
    pub transfer_limit: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Smallest quadrant edge the query may split down to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_extent: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Decal drawn over every brick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_threads() -> usize { num_cpus::get() }
fn default_tile_size() -> u32 { 256 }
fn default_block_size() -> u32 { 16 }
fn default_sample_stride() -> u32 { DEFAULT_SAMPLE_STRIDE }
fn default_density_block_size() -> u32 { 4 }
fn default_max_value() -> u32 { DEFAULT_DENSITY_MAX }
fn default_density_color() -> Rgb { Rgb::new(0, 255, 0) }
fn default_transfer_limit() -> usize { 1000 }
fn default_max_depth() -> u32 { DEFAULT_MAX_DEPTH }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { threads: default_threads() }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            block_size: default_block_size(),
            sample_stride: default_sample_stride(),
        }
    }
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            block_size: default_density_block_size(),
            max_value: default_max_value(),
            color: default_density_color(),
            transfer_limit: default_transfer_limit(),
            max_depth: default_max_depth(),
            min_extent: None,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => match Self::discover() {
                Some(path) => {
                    log::info!("Loading configuration from: {}", path.display());
                    Self::load_from_file(&path)?
                }
                None => {
                    log::info!("Using default configuration");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// `brickmap.toml` in the working directory, then in the user config dir.
    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("brickmap").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    pub fn parse(content: &str) -> CliResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Example configuration file content
    pub fn example_toml() -> Result<String> {
        let mut config = Self::default();
        config.color.palette = vec![
            Rgb::new(160, 40, 30),
            Rgb::new(200, 90, 60),
            Rgb::new(120, 110, 100),
            Rgb::new(230, 220, 200),
        ];
        config.tone.saturate = Some(1.2);
        config.to_toml()
    }

    /// Reject settings the core would fail on later with a less helpful message.
    pub fn validate(&self) -> CliResult<()> {
        let tile = &self.tile;
        if tile.tile_size == 0 {
            return Err(CliError::config("tile.tile_size must be at least 1"));
        }
        if tile.block_size == 0 || tile.tile_size % tile.block_size != 0 {
            return Err(CliError::config(format!(
                "tile.block_size {} must evenly divide tile.tile_size {}",
                tile.block_size, tile.tile_size
            )));
        }
        if tile.sample_stride == 0 {
            return Err(CliError::config("tile.sample_stride must be at least 1"));
        }
        if self.density.block_size == 0 || tile.tile_size % self.density.block_size != 0 {
            return Err(CliError::config(format!(
                "density.block_size {} must evenly divide tile.tile_size {}",
                self.density.block_size, tile.tile_size
            )));
        }
        if self.density.max_value == 0 {
            return Err(CliError::config("density.max_value must be at least 1"));
        }
        if self.density.transfer_limit == 0 {
            return Err(CliError::config("density.transfer_limit must be at least 1"));
        }
        if let Some(amount) = self.color.contrast {
            if !(-255.0..=255.0).contains(&amount) {
                return Err(CliError::config(format!("color.contrast {} is outside [-255, 255]", amount)));
            }
        }
        Ok(())
    }

    /// Palette built once for the session; `None` when no palette is configured.
    pub fn palette(&self) -> Option<Palette> {
        if self.color.palette.is_empty() {
            None
        } else {
            Some(Palette::from_rgb(&self.color.palette))
        }
    }

    pub fn reducer(&self) -> CliResult<BlockReducer> {
        let sampler = AverageSampler::new(self.tile.sample_stride)?;
        let mut reducer = BlockReducer::new(sampler).with_tone(self.tone);
        if let Some(palette) = self.palette() {
            reducer = reducer.with_palette(palette, self.color.metric);
        }
        match reducer.palette() {
            Some(palette) => log::debug!("Using {}-colour palette ({:?} metric)", palette.len(), self.color.metric),
            None => log::debug!("No palette configured; keeping sampled colours"),
        }
        Ok(reducer)
    }

    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            max_depth: self.density.max_depth,
            min_extent: self.density.min_extent,
        }
    }

    pub fn density_style(&self) -> DensityStyle {
        DensityStyle {
            color: self.density.color,
            max_value: self.density.max_value,
            block_size: self.density.block_size,
        }
    }
}
