//! Decorative decal composited over each block

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::Path;

/// Decal image drawn on top of every block fill
#[derive(Debug, Clone)]
pub struct Overlay {
    decal: RgbaImage,
}

impl Overlay {
    pub fn new(decal: RgbaImage) -> Self {
        Self { decal }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decal = image::open(path)
            .with_context(|| format!("Failed to load overlay decal {}", path.display()))?
            .to_rgba8();
        Ok(Self::new(decal))
    }

    /// Load a decal, degrading to no overlay when it cannot be read.
    pub fn load_or_skip<P: AsRef<Path>>(path: P) -> Option<Self> {
        match Self::load(&path) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                log::warn!("{:#}; rendering without overlay", e);
                None
            }
        }
    }

    /// The decal resized to a `block_size` square.
    pub fn scaled(&self, block_size: u32) -> RgbaImage {
        if self.decal.dimensions() == (block_size, block_size) {
            return self.decal.clone();
        }
        imageops::resize(&self.decal, block_size, block_size, FilterType::Triangle)
    }

    /// Alpha-composite a pre-scaled decal onto every block of `canvas`.
    pub fn stamp(canvas: &mut RgbaImage, scaled: &RgbaImage, block_size: u32) {
        let (width, height) = canvas.dimensions();
        for y in (0..height).step_by(block_size as usize) {
            for x in (0..width).step_by(block_size as usize) {
                imageops::overlay(canvas, scaled, x as i64, y as i64);
            }
        }
    }
}
