//! Criterion benchmarks for reposo-core buffer fills
//!
//! Run with: cargo bench -p reposo-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use reposo_core::{BUFFER_SAMPLES, NoiseGenerator, NoiseProfile, ToneGenerator, ToneMode, ToneParams};

const SAMPLE_RATE: f64 = 44100.0;

fn bench_tone(c: &mut Criterion) {
    let mut group = c.benchmark_group("ToneGenerator");

    for mode in ToneMode::ALL {
        let params = ToneParams::new(6.0, 200.0, 0.4, mode, 0.5);
        group.bench_with_input(BenchmarkId::new("render", mode), &params, |b, params| {
            let mut tone = ToneGenerator::new(SAMPLE_RATE, params);
            let mut buf = vec![0.0f32; BUFFER_SAMPLES];
            b.iter(|| {
                tone.render(black_box(params), &mut buf);
                black_box(&buf);
            });
        });
    }

    group.finish();
}

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("NoiseGenerator");

    for profile in NoiseProfile::ALL {
        group.bench_with_input(BenchmarkId::new("render", profile), &profile, |b, &profile| {
            let mut noise = NoiseGenerator::new(profile, SAMPLE_RATE as u32, 1);
            let mut buf = vec![0.0f32; BUFFER_SAMPLES / 2];
            b.iter(|| {
                noise.render(&mut buf);
                black_box(&buf);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tone, bench_noise);
criterion_main!(benches);
