use brickmap_core::{AverageSampler, BlockReducer, DistanceMetric, Palette, PixelBuffer, Rgb, ToneFilter};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn generate_tile(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255]);
        }
    }
    data
}

fn brick_palette() -> Palette {
    Palette::from_rgb(&[
        Rgb::new(242, 243, 242),
        Rgb::new(196, 40, 27),
        Rgb::new(13, 105, 171),
        Rgb::new(245, 205, 47),
        Rgb::new(40, 127, 70),
        Rgb::new(27, 42, 52),
        Rgb::new(160, 95, 52),
        Rgb::new(163, 162, 164),
    ])
}

fn bench_plain_reduction(c: &mut Criterion) {
    let data = generate_tile(256);
    let buffer = PixelBuffer::new(&data, 256, 256).unwrap();
    let reducer = BlockReducer::default();

    c.bench_function("reduce_256_block16", |b| {
        b.iter(|| black_box(reducer.reduce(black_box(&buffer), 16).unwrap()))
    });
}

fn bench_palette_reduction(c: &mut Criterion) {
    let data = generate_tile(256);
    let buffer = PixelBuffer::new(&data, 256, 256).unwrap();
    let reducer = BlockReducer::new(AverageSampler::default())
        .with_palette(brick_palette(), DistanceMetric::Linear)
        .with_tone(ToneFilter { saturate: Some(1.5), darken: Some(0.1), ..Default::default() });

    c.bench_function("reduce_256_block8_palette", |b| {
        b.iter(|| black_box(reducer.reduce(black_box(&buffer), 8).unwrap()))
    });
}

criterion_group!(benches, bench_plain_reduction, bench_palette_reduction);
criterion_main!(benches);
