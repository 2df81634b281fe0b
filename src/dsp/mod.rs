//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice graphs. They stay focused on the signal math so
//! graph combinators can layer on note events and modulation.

/// Linear ADSR and percussive exponential envelopes.
pub mod envelope;
/// State-variable filter with low-pass and high-pass responses.
pub mod filter;
/// Control-rate oscillator helpers.
pub mod lfo;
/// Block-rate modulation math.
pub mod modulate;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;

pub use envelope::EnvelopeState;
