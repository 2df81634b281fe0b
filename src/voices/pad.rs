//! Pad voice - slow, soft ambient texture.
//!
//! # How It Works
//!
//! 1. A single triangle oscillator: weak odd harmonics, nothing sharp
//! 2. Slow linear attack (0.3-0.5 s) so pads swell in rather than start
//! 3. The gate stays open 1.0-1.2 s after the attack, then releases over
//!    0.4-0.5 s
//! 4. Low-pass between 900 and 1300 Hz keeps it behind everything else
//!
//! Pads are the quietest family; the routine that plays them scales the
//! activation by a small gain so up to three can overlap without crowding
//! the bell and harp.

use rand::Rng;

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode},
    voices::VoicePatch,
};

pub fn pad<R: Rng + ?Sized>(rng: &mut R) -> VoicePatch {
    let attack = rng.gen_range(0.3..=0.5);
    let sustain_time = rng.gen_range(1.0..=1.2);
    let release = rng.gen_range(0.4..=0.5);
    let cutoff = rng.gen_range(900.0..=1300.0);

    let graph = OscNode::triangle()
        .through(FilterNode::lowpass(cutoff))
        .amplify(EnvNode::adsr(attack, 0.2, 0.85, release))
        .boxed();

    VoicePatch {
        graph,
        hold: attack + sustain_time,
        release,
    }
}
