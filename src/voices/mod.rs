//! The voice catalog.
//!
//! Four fixed timbre families, each built from graph nodes with a little
//! randomized micro-variation per note so repeated triggers never sound
//! identical. Every builder takes the caller's RNG, which keeps note-to-note
//! variation reproducible under a seeded generator.
//!
//! # Example
//!
//! ```ignore
//! use neurosonic::voices::{self, VoiceKind};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let bell = voices::build(VoiceKind::Bell, &mut rng);
//! ```
//!
//! | Family   | Used for                                   |
//! |----------|--------------------------------------------|
//! | pad      | ambient texture from the first hidden layer |
//! | bell     | lead notes from the second hidden layer    |
//! | harp     | output-layer arpeggios                     |
//! | ensemble | sustained chords from the "synth" instrument |

use rand::Rng;

use crate::graph::GraphNode;

mod bell;
mod ensemble;
mod harp;
mod pad;

pub use bell::bell;
pub use ensemble::ensemble;
pub use harp::harp;
pub use pad::pad;

/// Amplitudes below this are dropped before a voice is built.
pub const AUDIBLE_FLOOR: f32 = 0.001;

/// Extra lifetime granted past a voice's natural end before it is
/// force-disposed.
pub const SAFETY_MARGIN: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    Pad,
    Bell,
    Harp,
    Synth,
}

impl VoiceKind {
    pub fn name(self) -> &'static str {
        match self {
            VoiceKind::Pad => "pad",
            VoiceKind::Bell => "bell",
            VoiceKind::Harp => "harp",
            VoiceKind::Synth => "synth",
        }
    }
}

/// One freshly built voice graph plus the timing its owner needs.
pub struct VoicePatch {
    pub graph: Box<dyn GraphNode>,
    /// Seconds from note-on until the gate closes
    pub hold: f32,
    /// Seconds the graph may keep sounding after the gate closes
    pub release: f32,
}

impl VoicePatch {
    /// Natural duration plus [`SAFETY_MARGIN`]; no voice lives longer.
    pub fn lifetime(&self) -> f32 {
        self.hold + self.release + SAFETY_MARGIN
    }
}

pub fn build<R: Rng + ?Sized>(kind: VoiceKind, rng: &mut R) -> VoicePatch {
    match kind {
        VoiceKind::Pad => pad(rng),
        VoiceKind::Bell => bell(rng),
        VoiceKind::Harp => harp(rng),
        VoiceKind::Synth => ensemble(rng),
    }
}

pub fn is_audible(amplitude: f32) -> bool {
    amplitude >= AUDIBLE_FLOOR
}
