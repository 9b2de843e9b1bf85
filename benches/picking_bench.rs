//! Picking overlay benchmarks: ID codec, tessellation, queries, frames.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use mirrorpick::geometry::Shape;
use mirrorpick::options::ReadbackMode;
use mirrorpick::picking::{decode, encode, ObjectId, PickingOverlay};
use mirrorpick::Color;

fn id_codec_benchmark(c: &mut Criterion) {
    c.bench_function("encode_decode_id", |b| {
        b.iter(|| black_box(decode(encode(black_box(0x00AB_CDEF)))))
    });
}

fn tessellation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tessellate");
    for (name, shape) in [
        ("box", Shape::cube(50.0)),
        ("sphere", Shape::sphere(50.0)),
        ("torus", Shape::torus(50.0, 10.0)),
    ] {
        group.bench_function(name, |b| b.iter(|| black_box(shape.tessellate())));
    }
    group.finish();
}

fn scene_of_boxes(
    readback: ReadbackMode,
) -> PickingOverlay<mirrorpick::SoftwareCanvas, mirrorpick::SoftwareCanvas> {
    let mut overlay = PickingOverlay::initialize(400, 300)
        .unwrap()
        .with_readback(readback);
    overlay.begin_frame(Color::gray(200));
    for i in 0..10_u32 {
        overlay.push().unwrap();
        overlay
            .translate(-180.0 + 40.0 * i as f32, 0.0, i as f32)
            .unwrap();
        overlay
            .draw_box(ObjectId::new(i + 1).unwrap(), 30.0, 30.0, 30.0)
            .unwrap();
        overlay.pop().unwrap();
    }
    overlay
}

fn query_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_object_at");
    for (name, mode) in [
        ("single_pixel", ReadbackMode::SinglePixel),
        ("full_buffer", ReadbackMode::FullBuffer),
    ] {
        let mut overlay = scene_of_boxes(mode);
        group.bench_function(name, |b| {
            b.iter(|| black_box(overlay.query_object_at(black_box(180.0), 150.0)))
        });
    }
    group.finish();
}

fn frame_benchmark(c: &mut Criterion) {
    c.bench_function("frame_10_boxes", |b| {
        b.iter(|| black_box(scene_of_boxes(ReadbackMode::SinglePixel)))
    });
}

criterion_group!(
    benches,
    id_codec_benchmark,
    tessellation_benchmark,
    query_benchmark,
    frame_benchmark
);
criterion_main!(benches);
