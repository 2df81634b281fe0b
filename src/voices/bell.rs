//! Bell voice - struck lead tone with a wobbling resonant filter.
//!
//! # How It Works
//!
//! 1. Sine fundamental plus a quieter sine at 2.01x (a slightly stretched
//!    octave; the mistuning is what makes it shimmer like metal)
//! 2. Percussive envelope: 1-30 ms attack, exponential decay over 1.2-1.8 s
//! 3. Resonant low-pass centered on 2.2 kHz, swept ±1.2 kHz by a slow sine
//!    LFO (0.6-1.4 Hz) - the "wobble"
//!
//! No gate: the envelope ends the note on its own.

use rand::Rng;

use crate::{
    graph::{
        envelope::EnvNode,
        extensions::NodeExt,
        filter::{FilterNode, FilterParam},
        lfo::LfoNode,
        oscillator::OscNode,
    },
    voices::VoicePatch,
};

/// Weight of the stretched octave relative to the fundamental.
const OVERTONE_WEIGHT: f32 = 0.3;

pub fn bell<R: Rng + ?Sized>(rng: &mut R) -> VoicePatch {
    let attack = rng.gen_range(0.001..=0.03);
    let decay = rng.gen_range(1.2..=1.8);
    let wobble_hz = rng.gen_range(0.6..=1.4);
    let wobble_phase = rng.gen_range(0.0..1.0);

    let graph = OscNode::sine()
        .mix(
            OscNode::sine().with_ratio(2.01),
            OVERTONE_WEIGHT / (1.0 + OVERTONE_WEIGHT),
        )
        .amplify(EnvNode::perc(attack, decay))
        .through(
            FilterNode::lowpass(2200.0)
                .with_resonance(0.55)
                .modulate(
                    LfoNode::sine(wobble_hz).with_phase(wobble_phase),
                    FilterParam::Cutoff,
                    1200.0,
                ),
        )
        .boxed();

    VoicePatch {
        graph,
        hold: attack + decay,
        release: 0.0,
    }
}
