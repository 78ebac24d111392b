//! Tile rasterization and PNG I/O

use anyhow::{Context, Result};
use brickmap_core::color::clamp;
use brickmap_core::{BrickResult, DensityGrid, PixelBuffer, ReducedTile, Rgb};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::path::Path;

use crate::fill::block_fill;
use crate::overlay::Overlay;

/// Default density count that maps to a fully opaque block
pub const DEFAULT_DENSITY_MAX: u32 = 200;

/// Paint a `cols x rows` grid of solid `block_size` squares, row-major colours.
fn fill_blocks(cols: u32, rows: u32, block_size: u32, colors: &[Rgba<u8>]) -> RgbaImage {
    let width = cols * block_size;
    let height = rows * block_size;
    let mut img = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return img;
    }

    let row_bytes = width as usize * 4;
    img.par_chunks_mut(row_bytes).enumerate().for_each(|(y, line)| {
        let block_row = y as u32 / block_size;
        for (x, px) in line.chunks_exact_mut(4).enumerate() {
            let block_col = x as u32 / block_size;
            let color = colors[(block_row * cols + block_col) as usize];
            px.copy_from_slice(&color.0);
        }
    });
    img
}

/// Renders reduced block colours into an output tile
#[derive(Debug, Clone, Default)]
pub struct TileRenderer {
    contrast: Option<f64>,
    overlay: Option<Overlay>,
}

impl TileRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an RGB contrast stretch to every block fill.
    pub fn with_contrast(mut self, amount: Option<f64>) -> Self {
        self.contrast = amount;
        self
    }

    pub fn with_overlay(mut self, overlay: Option<Overlay>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Fill each block with its colour and stamp the decal on top.
    pub fn render_bricks(&self, tile: &ReducedTile) -> RgbaImage {
        let fills: Vec<Rgba<u8>> = tile
            .blocks
            .iter()
            .map(|block| {
                let rgb = block_fill(block.color, self.contrast);
                Rgba([rgb.r, rgb.g, rgb.b, 255])
            })
            .collect();

        let mut img = fill_blocks(tile.cols, tile.rows, tile.block_size, &fills);
        if let Some(overlay) = &self.overlay {
            let decal = overlay.scaled(tile.block_size);
            Overlay::stamp(&mut img, &decal, tile.block_size);
        }

        log::debug!(
            "Rendered {}x{} brick tile ({} blocks, overlay: {})",
            img.width(),
            img.height(),
            tile.blocks.len(),
            self.overlay.is_some()
        );
        img
    }
}

/// Fill colour and scaling for density tiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityStyle {
    pub color: Rgb,
    /// Count at which a block becomes fully opaque
    pub max_value: u32,
    pub block_size: u32,
}

impl Default for DensityStyle {
    fn default() -> Self {
        Self {
            color: Rgb::new(0, 255, 0),
            max_value: DEFAULT_DENSITY_MAX,
            block_size: 4,
        }
    }
}

/// Block alpha for a density count: `count / max_value`, capped at opaque.
pub fn density_alpha(count: u32, max_value: u32) -> u8 {
    let ratio = count as f64 / max_value.max(1) as f64;
    (clamp(ratio, 0.0, 1.0) * 255.0).round() as u8
}

/// Rasterize a density grid on a transparent background.
pub fn render_density(grid: &DensityGrid, style: &DensityStyle) -> RgbaImage {
    let n = grid.blocks_per_axis();
    let Rgb { r, g, b } = style.color;
    let fills: Vec<Rgba<u8>> = grid
        .counts()
        .iter()
        .map(|&count| Rgba([r, g, b, density_alpha(count, style.max_value)]))
        .collect();

    let img = fill_blocks(n, n, style.block_size, &fills);
    log::debug!(
        "Rendered {}x{} density tile (max count {}, saturates at {})",
        img.width(),
        img.height(),
        grid.max_count(),
        style.max_value
    );
    img
}

/// Decode a source tile, resizing to a `tile_size` square when given.
pub fn load_tile<P: AsRef<Path>>(path: P, tile_size: Option<u32>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("Failed to decode tile {}", path.display()))?
        .to_rgba8();

    match tile_size {
        Some(size) if img.dimensions() != (size, size) => {
            log::info!(
                "Resizing {} from {}x{} to {}x{}",
                path.display(),
                img.width(),
                img.height(),
                size,
                size
            );
            Ok(imageops::resize(&img, size, size, FilterType::Triangle))
        }
        _ => Ok(img),
    }
}

/// Borrow a decoded image as a sampler buffer.
pub fn pixel_buffer(img: &RgbaImage) -> BrickResult<PixelBuffer<'_>> {
    PixelBuffer::new(img.as_raw(), img.width(), img.height())
}

pub fn save_png<P: AsRef<Path>>(img: &RgbaImage, path: P) -> Result<()> {
    let path = path.as_ref();
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
