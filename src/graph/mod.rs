//! Composable building blocks for constructing voice graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what instrument design
//! needs: note events, modulation, block-based rendering, and an activity
//! flag that lets a finished voice be disposed. The `extensions` module adds
//! fluent helpers so patches read as a chain.

/// Multiply two signals together (amplitude gating).
pub mod amplify;
/// Envelope generator node (ADSR or percussive).
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.mix()`, etc.).
pub mod extensions;
/// State-variable filter node.
pub mod filter;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// Linear mixing for parallel generators.
pub mod mix;
/// Connect modulation sources to node parameters.
pub mod modulate;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;
/// Exponential one-way ramp for filter sweeps.
pub mod ramp;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use node::{GraphNode, RenderCtx};
