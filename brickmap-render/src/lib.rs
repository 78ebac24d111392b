/*!
# Brickmap Rasterizer

Turns the per-block results of `brickmap-core` into output tiles:

1. **Brick tiles**: every block filled with its reduced HSL colour (resolved
   to RGB here, optionally contrast-stretched), then the decorative decal
   composited on top.
2. **Density tiles**: every block filled with a fixed colour whose alpha
   follows the block's feature count.

PNG decoding and encoding go through the `image` crate.
*/

pub mod fill;
pub mod overlay;
pub mod raster;

pub use fill::{block_fill, hsl_to_rgb};
pub use overlay::Overlay;
pub use raster::{
    density_alpha, load_tile, pixel_buffer, render_density, save_png, DensityStyle, TileRenderer,
    DEFAULT_DENSITY_MAX,
};

pub use image::RgbaImage;
