use brickmap_core::query::layer::Point;
use brickmap_core::{
    aggregate_density, BlockReducer, DistanceMetric, Palette, PointLayer, QuadrantQuery,
    QueryBounds, Quantization, Rgb,
};
use brickmap_render::{
    load_tile, pixel_buffer, render_density, save_png, DensityStyle, Overlay, TileRenderer,
};
use image::{Rgba, RgbaImage};

/// 64x64 tile with four solid 32x32 quadrants
fn quadrant_tile() -> RgbaImage {
    RgbaImage::from_fn(64, 64, |x, y| match (x < 32, y < 32) {
        (true, true) => Rgba([255, 0, 0, 255]),
        (false, true) => Rgba([0, 255, 0, 255]),
        (true, false) => Rgba([0, 0, 255, 255]),
        (false, false) => Rgba([255, 255, 255, 255]),
    })
}

fn alpha_histogram(img: &RgbaImage) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for p in img.pixels() {
        hist[p[3] as usize] += 1;
    }
    hist
}

#[test]
fn brick_tile_survives_png_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("source.png");
    let output = dir.path().join("bricks.png");
    save_png(&quadrant_tile(), &input).unwrap();

    let source = load_tile(&input, None).unwrap();
    let buffer = pixel_buffer(&source).unwrap();
    let reduced = BlockReducer::default().reduce(&buffer, 16).unwrap();
    assert_eq!((reduced.cols, reduced.rows), (4, 4));
    assert_eq!(reduced.degraded_count(), 0);

    let img = TileRenderer::new().render_bricks(&reduced);
    save_png(&img, &output).unwrap();

    let reloaded = image::open(&output).unwrap().to_rgba8();
    assert_eq!(reloaded.dimensions(), (64, 64));
    assert_eq!(*reloaded.get_pixel(5, 5), Rgba([255, 0, 0, 255]));
    assert_eq!(*reloaded.get_pixel(40, 10), Rgba([0, 255, 0, 255]));
    assert_eq!(*reloaded.get_pixel(10, 40), Rgba([0, 0, 255, 255]));
    assert_eq!(*reloaded.get_pixel(63, 63), Rgba([255, 255, 255, 255]));
}

#[test]
fn palette_snaps_rendered_blocks() {
    let source = quadrant_tile();
    let buffer = pixel_buffer(&source).unwrap();
    // every quadrant is pulled to one of two bricks
    let palette = Palette::from_rgb(&[Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]);
    let reducer = BlockReducer::default().with_palette(palette, DistanceMetric::Linear);
    let img = TileRenderer::new().render_bricks(&reducer.reduce(&buffer, 16).unwrap());

    for p in img.pixels() {
        assert!(*p == Rgba([0, 0, 0, 255]) || *p == Rgba([255, 255, 255, 255]), "{:?}", p);
    }
    assert_eq!(*img.get_pixel(63, 63), Rgba([255, 255, 255, 255]));
}

#[test]
fn overlay_decal_is_stamped_per_block() {
    let dir = tempfile::tempdir().unwrap();
    let decal_path = dir.path().join("decal.png");
    let mut decal = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
    decal.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
    save_png(&decal, &decal_path).unwrap();

    let source = quadrant_tile();
    let reduced = BlockReducer::default()
        .reduce(&pixel_buffer(&source).unwrap(), 16)
        .unwrap();
    let renderer = TileRenderer::new().with_overlay(Overlay::load_or_skip(&decal_path));
    assert!(renderer.has_overlay());

    let img = renderer.render_bricks(&reduced);
    for block_origin in [0, 16, 32, 48] {
        assert_eq!(*img.get_pixel(block_origin, block_origin), Rgba([0, 0, 0, 255]));
    }
    assert_eq!(*img.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
}

#[test]
fn load_tile_resizes_to_tile_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.png");
    save_png(&RgbaImage::from_pixel(32, 32, Rgba([0, 0, 255, 255])), &path).unwrap();

    let tile = load_tile(&path, Some(64)).unwrap();
    assert_eq!(tile.dimensions(), (64, 64));
    assert!(load_tile(dir.path().join("missing.png"), None).is_err());
}

#[tokio::test]
async fn density_png_histogram_is_stable() {
    let extent = QueryBounds::new(0.0, 0.0, 64.0, 64.0);
    let points: Vec<Point> = (0..400u64)
        .map(|i| Point { id: i, x: (i % 20) as f64 * 3.0 + 0.5, y: (i / 20) as f64 * 3.0 + 0.5 })
        .collect();
    let layer = PointLayer::new(points, 50).unwrap();
    let view = layer.view(Quantization::for_tile(extent, 64, 4).unwrap());
    let query = QuadrantQuery::new(&view);

    let style = DensityStyle { max_value: 4, ..Default::default() };
    let dir = tempfile::tempdir().unwrap();
    let mut histograms = Vec::new();
    for name in ["d1.png", "d2.png"] {
        let (grid, outcome) = aggregate_density(&query, extent, 16, false).await.unwrap();
        assert_eq!(outcome.features.len(), 400);

        let path = dir.path().join(name);
        save_png(&render_density(&grid, &style), &path).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded.dimensions(), (64, 64));
        histograms.push(alpha_histogram(&reloaded));
    }

    assert_eq!(histograms[0], histograms[1], "alpha histogram differs between identical renders");
    assert!(histograms[0][255] > 0);
}
