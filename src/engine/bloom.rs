//! Visual bloom: a decaying excitation signal for the renderer.
//!
//! Never used for audio. Recomputed from routine timestamps every frame:
//!
//!   Level
//!    1.0 ┐ ╱╲
//!        │╱  ╲_
//!        │     ‾‾──___
//!    0.0 └────────────‾‾──→ elapsed
//!        attack  exp(-4·t)   total
//!
//! A slow triangle shimmer then dips the envelope by up to `depth`.

use crate::{config::BloomConfig, dsp::lfo::triangle_unipolar};

/// Per-frame bloom pair, both in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BloomFrame {
    pub hidden_bloom: f32,
    pub output_bloom: f32,
}

/// Linear attack then exponential decay; 0 outside `[0, total]`.
pub fn envelope(elapsed: f32, attack: f32, total: f32) -> f32 {
    if !(0.0..=total).contains(&elapsed) {
        return 0.0;
    }
    if elapsed < attack {
        return elapsed / attack;
    }
    let decay_time = (total - attack).max(f32::EPSILON);
    (-4.0 * (elapsed - attack) / decay_time).exp()
}

/// Bloom for a trigger at `last_trigger`, sampled at `now`.
pub fn sample(config: &BloomConfig, last_trigger: Option<f64>, now: f64) -> f32 {
    let Some(at) = last_trigger else {
        return 0.0;
    };
    let elapsed = (now - at) as f32;
    let env = envelope(elapsed, config.attack, config.total);
    if env == 0.0 {
        return 0.0;
    }

    let shimmer = triangle_unipolar(f64::from(elapsed) * f64::from(config.lfo_hz));
    (env * (1.0 - config.depth * shimmer)).clamp(0.0, 1.0)
}
