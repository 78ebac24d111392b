//! Block reduction driver
//!
//! Turns a decoded tile into one HSL colour per block. The per-block stages
//! always run in this order:
//!
//! 1. average sample (RGB)
//! 2. RGB -> HSL
//! 3. saturate
//! 4. palette snap
//! 5. darken / lighten
//!
//! Moving saturation after the snap, or lightness before it, changes which
//! palette entry is picked, so the order is fixed here rather than left to
//! callers.

use rayon::prelude::*;

use crate::color::{rgb_to_hsl, DistanceMetric, Hsl, Palette, ToneFilter};
use crate::error::{BrickError, BrickResult};
use crate::sampler::{AverageSampler, PixelBuffer, Region};

/// Colour used for a block whose reduction failed
pub const DEGRADED_BLOCK_COLOR: Hsl = Hsl::new(0.0, 0.0, 0.0);

/// Reduced colour of a single block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockColor {
    pub col: u32,
    pub row: u32,
    pub color: Hsl,
    /// Set when sampling failed and `color` is [`DEGRADED_BLOCK_COLOR`]
    pub degraded: bool,
}

/// All blocks of a tile in row-major order
#[derive(Debug, Clone)]
pub struct ReducedTile {
    pub block_size: u32,
    pub cols: u32,
    pub rows: u32,
    pub blocks: Vec<BlockColor>,
}

impl ReducedTile {
    pub fn get(&self, col: u32, row: u32) -> Option<&BlockColor> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.blocks.get((row * self.cols + col) as usize)
    }

    pub fn degraded_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.degraded).count()
    }

    /// Pixel rectangle covered by a block
    pub fn region(&self, block: &BlockColor) -> Region {
        Region::block(block.col, block.row, self.block_size)
    }
}

/// Validate a block size against tile dimensions and return `(cols, rows)`.
pub fn block_grid(width: u32, height: u32, block_size: u32) -> BrickResult<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(BrickError::InvalidParams(format!("tile size {}x{} is empty", width, height)));
    }
    if block_size == 0 || width % block_size != 0 || height % block_size != 0 {
        return Err(BrickError::InvalidBlockSize { block_size, width, height });
    }
    Ok((width / block_size, height / block_size))
}

/// Session-level settings for reducing tiles to block colours
#[derive(Debug, Clone, Default)]
pub struct BlockReducer {
    sampler: AverageSampler,
    palette: Option<Palette>,
    metric: DistanceMetric,
    tone: ToneFilter,
}

impl BlockReducer {
    pub fn new(sampler: AverageSampler) -> Self {
        Self {
            sampler,
            ..Default::default()
        }
    }

    pub fn with_palette(mut self, palette: Palette, metric: DistanceMetric) -> Self {
        self.palette = Some(palette);
        self.metric = metric;
        self
    }

    pub fn with_tone(mut self, tone: ToneFilter) -> Self {
        self.tone = tone;
        self
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Run the colour stages on one block.
    pub fn reduce_block(&self, buffer: &PixelBuffer<'_>, region: Region) -> BrickResult<Hsl> {
        let rgb = self.sampler.sample(buffer, region)?;
        Ok(self.adjust(rgb_to_hsl(rgb)))
    }

    /// Stages 3 to 5 on an already converted colour.
    pub fn adjust(&self, hsl: Hsl) -> Hsl {
        let mut color = self.tone.apply_saturate(hsl);
        if let Some(palette) = &self.palette {
            color = palette.snap(color, self.metric);
        }
        self.tone.apply_lightness(color)
    }

    /// Reduce every block of a tile.
    ///
    /// Blocks are processed in parallel. A block that cannot be sampled is
    /// logged and filled with [`DEGRADED_BLOCK_COLOR`]; only an invalid block
    /// size fails the whole tile.
    pub fn reduce(&self, buffer: &PixelBuffer<'_>, block_size: u32) -> BrickResult<ReducedTile> {
        let (cols, rows) = block_grid(buffer.width(), buffer.height(), block_size)?;

        let blocks: Vec<BlockColor> = (0..cols * rows)
            .into_par_iter()
            .map(|idx| {
                let row = idx / cols;
                let col = idx % cols;
                match self.reduce_block(buffer, Region::block(col, row, block_size)) {
                    Ok(color) => BlockColor { col, row, color, degraded: false },
                    Err(e) => {
                        log::warn!("Block ({}, {}) degraded: {}", col, row, e);
                        BlockColor { col, row, color: DEGRADED_BLOCK_COLOR, degraded: true }
                    }
                }
            })
            .collect();

        log::debug!(
            "Reduced {}x{} tile into {}x{} blocks of {}px",
            buffer.width(),
            buffer.height(),
            cols,
            rows,
            block_size
        );

        Ok(ReducedTile { block_size, cols, rows, blocks })
    }
}
