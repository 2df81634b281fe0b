//! Benchmark for a full voice bank.
//!
//! 24 overlapping voices across all families, roughly what a busy session
//! with several participants produces. Voices finish within seconds, so each
//! iteration gets a freshly filled bank with every voice already live.

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use neurosonic::synth::{SynthMessage, VoiceBank, VoiceInstance};
use neurosonic::voices::{self, VoiceKind};
use rand::{rngs::StdRng, SeedableRng};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;
const LIVE_VOICES: usize = 24;

fn full_bank(rng: &mut StdRng, size: usize) -> VoiceBank<VecDeque<SynthMessage>> {
    let mut queue = VecDeque::with_capacity(LIVE_VOICES);
    let kinds = [VoiceKind::Pad, VoiceKind::Bell, VoiceKind::Harp, VoiceKind::Synth];
    for i in 0..LIVE_VOICES {
        let kind = kinds[i % kinds.len()];
        let frequency = 110.0 * (1.0 + i as f32 * 0.25);
        let patch = voices::build(kind, rng);
        queue.push_back(SynthMessage::Start(VoiceInstance::new(
            kind,
            patch,
            frequency,
            0.05,
            SAMPLE_RATE,
        )));
    }

    let mut bank = VoiceBank::new(48, queue);
    bank.render_block(&mut vec![0.0; size]);
    bank
}

pub fn bench_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/bank");
    let mut rng = StdRng::seed_from_u64(1);

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];

        group.bench_with_input(
            BenchmarkId::new(format!("{LIVE_VOICES}_voices"), size),
            &size,
            |b, &size| {
                b.iter_batched_ref(
                    || full_bank(&mut rng, size),
                    |bank| bank.render_block(black_box(&mut out)),
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}
