use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use grada_core::catalog::Catalog;
use grada_core::curve;
use grada_core::frame::Frame;
use grada_core::pipeline::Pipeline;
use grada_core::resolve::{MediaKind, Overrides, resolve};

fn gradient(width: u32, height: u32) -> Frame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let u = x as f32 / width as f32;
            let v = y as f32 / height as f32;
            data.extend_from_slice(&[0.1 + 0.8 * u, 0.1 + 0.8 * v, 0.1 + 0.4 * (u + v), 1.0]);
        }
    }
    Frame { width, height, data }
}

fn bench_curve_compile(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let mut group = c.benchmark_group("curve_compile");
    for key in ["vibrance_boost", "gold_rush", "blue_skies"] {
        let curves = &catalog.get(key).map(|p| p.params.curves.clone()).unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(key), curves, |b, curves| {
            b.iter(|| curve::compile(black_box(curves)));
        });
    }
    group.finish();
}

fn bench_cpu_grade(c: &mut Criterion) {
    let pipeline = Pipeline::new();
    let catalog = Catalog::builtin();
    let mut group = c.benchmark_group("cpu_grade");

    for key in ["vivid_pop", "ultra_clarity", "mono_classic"] {
        let Some(preset) = catalog.get(key) else {
            continue;
        };
        let plan = resolve(Some(preset.as_ref()), &Overrides::default(), MediaKind::Image);
        let lut = curve::compile(&preset.params.curves);

        for size in [256u32, 512] {
            let frame = gradient(size, size);
            group.throughput(Throughput::Elements((size * size) as u64));
            group.bench_with_input(
                BenchmarkId::new(key, format!("{size}x{size}")),
                &frame,
                |b, frame| {
                    b.iter(|| {
                        pipeline
                            .process_cpu(black_box(frame.clone()), &plan, lut.as_ref())
                            .map(|f| f.width)
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_curve_compile, bench_cpu_grade);
criterion_main!(benches);
