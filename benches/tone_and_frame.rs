//! Benchmarks for tone rendering and the avatar frame.
//!
//! Run:
//! - cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use digital_soul::audio::{ToneEvent, ToneSpec};
use digital_soul::avatar::{Animator, AnimatorParams, RecordingSurface};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SAMPLE_RATES: [u32; 2] = [44_100, 48_000];
const PARTICLE_COUNTS: [usize; 3] = [300, 900, 3000];

fn bench_tone_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("tone_render");
    for event in [ToneEvent::Keystroke, ToneEvent::ProcessStart, ToneEvent::Error] {
        let spec = ToneSpec::for_event(event);
        for &fs in &SAMPLE_RATES {
            let id = BenchmarkId::new(format!("{event:?}"), fs);
            group.bench_with_input(id, &fs, |b, &fs| {
                b.iter(|| black_box(spec.render(black_box(fs))));
            });
        }
    }
    group.finish();
}

fn bench_avatar_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("avatar_frame");
    for &count in &PARTICLE_COUNTS {
        for speaking in [false, true] {
            let params = AnimatorParams {
                particle_count: count,
                ..AnimatorParams::default()
            };
            let mut anim = Animator::new(params, StdRng::seed_from_u64(1));
            let mut surface = RecordingSurface::new(800.0, 600.0);
            let mut t = 0.0f32;
            let id = BenchmarkId::new(if speaking { "speaking" } else { "idle" }, count);
            group.bench_function(id, |b| {
                b.iter(|| {
                    t += 0.016;
                    black_box(anim.frame(&mut surface, t, speaking));
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_tone_render, bench_avatar_frame);
criterion_main!(benches);
