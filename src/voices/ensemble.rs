//! Ensemble voice - detuned saw stack for sustained chords.
//!
//! # How It Works
//!
//! 1. Three sawtooths near unison (about -9, 0 and +9 cents, each nudged by up
//!    to a cent per note) beat against each other for width
//! 2. A sine an octave below adds weight without more buzz
//! 3. Medium attack (80-140 ms), gate held for 1.2 s, long release (1.2-1.6 s)
//! 4. Low-pass sweeping from 3.2 kHz down to 700 Hz across the whole note,
//!    so chords open bright and settle dark

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

const HOLD: f32 = 1.2;
const SPREAD_CENTS: f32 = 9.0;

pub fn ensemble<R: Rng + ?Sized>(rng: &mut R) -> VoicePatch {
    let attack = rng.gen_range(0.08..=0.14);
    let release = rng.gen_range(1.2..=1.6);
    let mut nudge = || rng.gen_range(-1.0..=1.0);

    let saws = OscNode::sawtooth()
        .with_detune(-SPREAD_CENTS + nudge())
        .mix(OscNode::sawtooth().with_detune(nudge()).with_phase(0.33), 0.5)
        .mix(
            OscNode::sawtooth()
                .with_detune(SPREAD_CENTS + nudge())
                .with_phase(0.66),
            1.0 / 3.0,
        );

    let graph = saws
        .mix(OscNode::sine().with_ratio(0.5), 0.3)
        .amplify(EnvNode::adsr(attack, 0.3, 0.8, release))
        .through(FilterNode::lowpass(700.0).modulate(
            RampNode::new(HOLD + release),
            FilterParam::Cutoff,
            2500.0,
        ))
        .boxed();

    VoicePatch {
        graph,
        hold: HOLD,
        release,
    }
}
