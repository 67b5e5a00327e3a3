use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cutout_refine::{
    apply_threshold, correct_shape, dilate, harden, sample_background, HardenMode, RefineConfig,
    ThresholdMode,
};
use image::{Rgba, RgbaImage};

fn bench_original(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, _| {
        if (size / 4..size * 3 / 4).contains(&x) {
            Rgba([60, 50, 45, 255])
        } else {
            Rgba([235, 235, 235, 255])
        }
    })
}

fn bench_cutout(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if (size / 4..size * 3 / 4).contains(&x) {
            Rgba([60, 50, 45, 200 + ((x + y) % 55) as u8])
        } else {
            Rgba([140, 140, 140, ((x * y) % 90) as u8])
        }
    })
}

fn benchmark_threshold(c: &mut Criterion) {
    let cutout = bench_cutout(512);
    c.bench_function("threshold_soft_512", |b| {
        b.iter(|| {
            apply_threshold(black_box(cutout.clone()), None, ThresholdMode::Soft, 60).unwrap()
        });
    });
}

fn benchmark_harden(c: &mut Criterion) {
    let config = RefineConfig::default();
    let original = bench_original(512);
    let cutout = bench_cutout(512);
    let bg = sample_background(&original, &config);
    c.bench_function("harden_symmetric_512", |b| {
        b.iter(|| {
            harden(
                black_box(cutout.clone()),
                &original,
                &bg,
                HardenMode::Symmetric,
                &config,
            )
            .unwrap()
        });
    });
}

fn benchmark_shape(c: &mut Criterion) {
    let config = RefineConfig::default();
    let cutout = bench_cutout(512);
    c.bench_function("shape_correct_512", |b| {
        b.iter(|| correct_shape(black_box(cutout.clone()), None, &config).unwrap());
    });
}

fn benchmark_dilate(c: &mut Criterion) {
    let config = RefineConfig::default();
    let cutout = bench_cutout(256);
    let mut group = c.benchmark_group("dilate_256");
    for radius in [2u32, 5, 10] {
        group.bench_function(format!("radius_{radius}"), |b| {
            b.iter(|| dilate(black_box(cutout.clone()), radius, &config).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_threshold,
    benchmark_harden,
    benchmark_shape,
    benchmark_dilate
);
criterion_main!(benches);
