use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

The sound source of every voice. It tracks the note frequency from the
render context, optionally scaled by a harmonic ratio and nudged by a detune
in cents:

  frequency = ctx.frequency × ratio × 2^(cents / 1200)

Waveforms used by the voice catalog:

  Sine      fundamental only       bell partials, harp partials, sub-octave
  Triangle  weak odd harmonics     pad body
  Sawtooth  every harmonic (1/n)   detuned ensemble

Ratios build harmonic stacks out of single-waveform oscillators:

  OscNode::sine()                       fundamental
  OscNode::sine().with_ratio(2.0)       octave
  OscNode::sine().with_ratio(3.0)       octave + fifth (perfect twelfth)
  OscNode::sine().with_ratio(2.01)      slightly stretched octave (bell shimmer)
  OscNode::sine().with_ratio(0.5)       sub-octave

Detune layers near-unison copies for width:

  OscNode::sawtooth()
      .mix(OscNode::sawtooth().with_detune(-9.0), 0.5)
      .mix(OscNode::sawtooth().with_detune(9.0), 0.33)

Phase resets to `start_phase` on note-on so every note starts identically;
give stacked copies different start phases to avoid a comb-filtered attack.
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Multiplier applied to the note frequency (1.0 = fundamental).
    ratio: f32,
    /// Detune in cents. 100 cents = 1 semitone.
    detune_cents: f32,
    start_phase: f32,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            ratio: 1.0,
            detune_cents: 0.0,
            start_phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorBlock::sawtooth())
    }

    pub fn square() -> Self {
        Self::new(OscillatorBlock::square())
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorBlock::triangle())
    }

    /// Play at `ratio` times the note frequency.
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio.max(0.0);
        self
    }

    /// Set detune in cents (100 cents = 1 semitone).
    pub fn with_detune(mut self, cents: f32) -> Self {
        self.detune_cents = cents;
        self
    }

    /// Phase (in cycles) each note starts from.
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.start_phase = phase.rem_euclid(1.0);
        self.osc.set_phase(self.start_phase);
        self
    }

    fn frequency(&self, note_frequency: f32) -> f32 {
        let base = note_frequency * self.ratio;
        if self.detune_cents != 0.0 {
            base * 2.0_f32.powf(self.detune_cents / 1200.0)
        } else {
            base
        }
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let shifted = RenderCtx {
            frequency: self.frequency(ctx.frequency),
            ..*ctx
        };
        self.osc.render(out, &shifted);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.set_phase(self.start_phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_note(sample_rate, 69, 1.0);
        let mut osc = OscNode::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.render_block(&mut buffer, &ctx);

        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / sample_rate).sin();
        assert!((buffer[n] - expected).abs() < 1e-4, "expected {expected}, got {}", buffer[n]);
    }

    #[test]
    fn ratio_and_detune_scale_frequency() {
        let osc = OscNode::sine().with_ratio(2.0).with_detune(1200.0);
        assert!((osc.frequency(100.0) - 400.0).abs() < 1e-3);
    }

    #[test]
    fn note_on_restarts_phase() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);
        let mut osc = OscNode::sine();

        let mut first = vec![0.0f32; 64];
        osc.render_block(&mut first, &ctx);
        osc.note_on(&ctx);
        let mut second = vec![0.0f32; 64];
        osc.render_block(&mut second, &ctx);

        assert_eq!(first, second);
    }
}
