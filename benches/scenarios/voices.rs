//! Benchmarks for the four voice families.
//!
//! Each voice is rebuilt whenever it finishes, so the numbers cover the
//! sounding part of the note rather than an idle graph.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use neurosonic::graph::RenderCtx;
use neurosonic::voices::{self, VoiceKind};
use rand::{rngs::StdRng, SeedableRng};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::from_freq(48_000.0, 220.0, 1.0);
    let mut rng = StdRng::seed_from_u64(0);

    let kinds = [
        VoiceKind::Pad,   // osc → filter → ADSR
        VoiceKind::Bell,  // 2 osc → perc → LFO-swept resonant filter
        VoiceKind::Harp,  // 4 enveloped partials → HP → ramp-swept LP
        VoiceKind::Synth, // 3 saws + sub → ADSR → ramp-swept LP
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for kind in kinds {
            let mut patch = voices::build(kind, &mut rng);
            patch.graph.note_on(&ctx);

            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    if !patch.graph.is_active() {
                        patch = voices::build(kind, &mut rng);
                        patch.graph.note_on(&ctx);
                    }
                    patch.graph.render_block(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
