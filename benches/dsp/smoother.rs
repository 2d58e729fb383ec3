//! Benchmarks for the parameter smoother.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::smoother::ParamSmoother;
use monosynth::graph::node::RenderCtx;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_smoother(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/smoother");
    let ctx = RenderCtx::new(SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Retargeted once per block, like a control tick
        let mut smoother = ParamSmoother::new(440.0, 0.01);
        let mut up = true;
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| {
                smoother.set_target(if up { 660.0 } else { 220.0 }, &ctx);
                up = !up;
                for sample in buffer.iter_mut() {
                    *sample = smoother.next_sample();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
