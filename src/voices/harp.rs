//! Harp voice - gentle plucked string for arpeggios.
//!
//! # How It Works
//!
//! Four sine partials, each with its own percussive envelope:
//!
//! | Partial              | Ratio       | Weight | Decay  |
//! |----------------------|-------------|--------|--------|
//! | fundamental          | 1.0         | 1.0    | 1.6 s  |
//! | octave               | 2.0         | 0.5    | 0.9 s  |
//! | perfect twelfth      | 3.0         | 0.25   | 0.6 s  |
//! | detuned fundamental  | 1.0 +4 cent | 0.6    | 1.3 s  |
//!
//! All decays are scaled together by 0.85-1.15 per note. Upper partials
//! dying first is what reads as "plucked". The sum goes through a 90 Hz
//! high-pass (no rumble) and then a low-pass whose cutoff falls from 5 kHz to
//! 1.2 kHz over the note, damping the string.

use rand::Rng;

use crate::{
    graph::{
        envelope::EnvNode,
        extensions::NodeExt,
        filter::{FilterNode, FilterParam},
        oscillator::OscNode,
        ramp::RampNode,
    },
    voices::VoicePatch,
};

const PARTIAL_DECAYS: [f32; 4] = [1.6, 0.9, 0.6, 1.3];

pub fn harp<R: Rng + ?Sized>(rng: &mut R) -> VoicePatch {
    let attack = rng.gen_range(0.002..=0.005);
    let scale = rng.gen_range(0.85..=1.15);
    let [fundamental, octave, twelfth, detuned] = PARTIAL_DECAYS.map(|d| d * scale);
    let longest = fundamental.max(detuned);

    // Chained mixes: each balance is the new partial's share of the running
    // weight total (1.0, 1.5, 1.75, 2.35).
    let graph = OscNode::sine()
        .amplify(EnvNode::perc(attack, fundamental))
        .mix(
            OscNode::sine().with_ratio(2.0).amplify(EnvNode::perc(attack, octave)),
            0.5 / 1.5,
        )
        .mix(
            OscNode::sine().with_ratio(3.0).amplify(EnvNode::perc(attack, twelfth)),
            0.25 / 1.75,
        )
        .mix(
            OscNode::sine()
                .with_detune(4.0)
                .with_phase(0.25)
                .amplify(EnvNode::perc(attack, detuned)),
            0.6 / 2.35,
        )
        .through(FilterNode::highpass(90.0))
        .through(FilterNode::lowpass(1200.0).modulate(
            RampNode::new(longest),
            FilterParam::Cutoff,
            3800.0,
        ))
        .boxed();

    VoicePatch {
        graph,
        hold: attack + longest,
        release: 0.0,
    }
}
