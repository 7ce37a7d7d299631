use circletrack_detect::{DetectionPipeline, PipelineParams};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

fn synthetic_frame() -> RgbImage {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([35, 35, 35]));
    draw_filled_circle_mut(&mut img, (340, 200), 45, Rgb([210, 210, 210]));
    draw_polygon_mut(
        &mut img,
        &[Point::new(60, 420), Point::new(180, 430), Point::new(120, 320)],
        Rgb([200, 60, 60]),
    );
    img
}

fn bench_pipeline(c: &mut Criterion) {
    let frame = synthetic_frame();
    let pipeline = DetectionPipeline::new(PipelineParams::default());
    c.bench_function("pipeline_640x480_armed", |b| {
        b.iter(|| pipeline.process(black_box(&frame), true))
    });
    c.bench_function("pipeline_640x480_disarmed", |b| {
        b.iter(|| pipeline.process(black_box(&frame), false))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
