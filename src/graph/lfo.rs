use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO Node
========

An oscillator at a fixed control-rate frequency that ignores the note pitch.
Output is bipolar (-1.0 … +1.0), meant to feed `.modulate()`:

  // Bell wobble: cutoff swings ±1200 Hz around 2200 Hz, about once a second
  FilterNode::lowpass(2200.0)
      .modulate(LfoNode::sine(0.9), FilterParam::Cutoff, 1200.0)

The phase restarts on note-on, so each struck note wobbles from the same
point of the cycle unless a start phase is given.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32,
    start_phase: f32,
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            frequency,
            start_phase: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.start_phase = phase.rem_euclid(1.0);
        self.osc.set_phase(self.start_phase);
        self
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let lfo_ctx = RenderCtx::from_freq(ctx.sample_rate, self.frequency, 1.0);
        self.osc.render(out, &lfo_ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.set_phase(self.start_phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_output_range() {
        let mut lfo = LfoNode::sine(5.0).with_phase(0.25);
        let mut buffer = vec![0.0; 2048];
        lfo.render_block(&mut buffer, &RenderCtx::from_freq(48_000.0, 440.0, 1.0));
        assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_lfo_ignores_note_frequency() {
        let mut a = vec![0.0; 512];
        let mut b = vec![0.0; 512];

        LfoNode::sine(5.0).render_block(&mut a, &RenderCtx::from_freq(48_000.0, 440.0, 1.0));
        LfoNode::sine(5.0).render_block(&mut b, &RenderCtx::from_freq(48_000.0, 880.0, 1.0));

        assert_eq!(a, b);
    }
}
