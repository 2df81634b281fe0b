//! Benchmarks for the control path: building and draining arpeggios.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use neurosonic::config::Span;
use neurosonic::engine::{
    arpeggio::{active_notes, build_arpeggio},
    scheduler::NoteScheduler,
};
use neurosonic::voices::VoiceKind;
use rand::{rngs::StdRng, SeedableRng};

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/scheduler");
    let mut rng = StdRng::seed_from_u64(2);
    let output: Vec<f32> = (0..10).map(|i| (i as f32 * 0.37).sin().abs()).collect();

    for repetitions in [2u32, 4] {
        let notes = active_notes(&output, 0.1);

        group.bench_with_input(
            BenchmarkId::new("arpeggio_build", repetitions),
            &repetitions,
            |b, &reps| {
                b.iter(|| build_arpeggio(black_box(&notes), reps, 0.12, Span::new(0.7, 1.4), &mut rng))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("schedule_and_drain", repetitions),
            &repetitions,
            |b, &reps| {
                let mut scheduler = NoteScheduler::new();
                let mut now = 0.0;
                b.iter(|| {
                    let steps = build_arpeggio(&notes, reps, 0.12, Span::new(0.7, 1.4), &mut rng);
                    for step in &steps {
                        scheduler.schedule_note(now, 440.0, 0.1, step.delay, VoiceKind::Harp);
                    }
                    now += 10.0;
                    black_box(scheduler.drain_due(now).len())
                })
            },
        );
    }

    group.finish();
}
