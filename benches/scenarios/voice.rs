//! Benchmarks for the complete voice.
//!
//! Each case renders through `Voice::render`, so message draining, LFO
//! routing and the envelope are all included.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::{LfoTarget, VoiceConfig, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for target in LfoTarget::ALL {
            let (mut voice, mut handle) =
                monosynth::voice(VoiceConfig::default().with_sample_rate(SAMPLE_RATE));
            handle.set_waveform(Waveform::Saw).ok();
            handle.set_lfo_target(target).ok();
            handle.note_on().ok();

            let name = format!("saw_lfo_{}", target.label().to_lowercase().replace(' ', "_"));
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    voice.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}

/// A block that starts with a route change, the worst case for the drain.
pub fn bench_retarget(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/retarget");
    let targets = [LfoTarget::Pitch, LfoTarget::FilterCutoff, LfoTarget::Amplitude];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let (mut voice, mut handle) =
            monosynth::voice(VoiceConfig::default().with_sample_rate(SAMPLE_RATE));
        handle.note_on().ok();
        let mut next = 0;

        group.bench_with_input(BenchmarkId::new("cycle_targets", size), &size, |b, _| {
            b.iter(|| {
                handle.set_lfo_target(targets[next % targets.len()]).ok();
                next += 1;
                voice.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
