//! Bricks command - reduce a source tile to coloured bricks

use anyhow::{Context, Result};
use brickmap_render::{load_tile, pixel_buffer, save_png, Overlay, TileRenderer};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::CliError;

pub fn execute(
    config: &Config,
    input: PathBuf,
    output: PathBuf,
    block_size: Option<u32>,
    overlay: Option<PathBuf>,
) -> Result<()> {
    log::info!("Input tile: {}", input.display());
    log::info!("Output file: {}", output.display());

    if !input.exists() {
        return Err(CliError::file_not_found(input).into());
    }

    let block_size = block_size.unwrap_or(config.tile.block_size);
    let source = load_tile(&input, Some(config.tile.tile_size))?;
    let buffer = pixel_buffer(&source).map_err(CliError::from)?;

    let reducer = config.reducer()?;
    let reduced = reducer
        .reduce(&buffer, block_size)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to reduce {}", input.display()))?;

    let degraded = reduced.degraded_count();
    if degraded > 0 {
        log::warn!("{} of {} blocks could not be sampled and were filled black", degraded, reduced.blocks.len());
    }
    log::info!("Reduced to {}x{} blocks of {}px", reduced.cols, reduced.rows, block_size);

    let overlay = overlay
        .or_else(|| config.overlay.path.clone())
        .and_then(Overlay::load_or_skip);

    let renderer = TileRenderer::new()
        .with_contrast(config.color.contrast)
        .with_overlay(overlay);
    let img = renderer.render_bricks(&reduced);

    save_png(&img, &output)?;
    log::info!("Bricks tile complete");
    Ok(())
}
