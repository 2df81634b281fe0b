use crate::{
    dsp::modulate::{apply_modulation, block_average},
    graph::node::{GraphNode, Modulatable, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Modulate Node
=============

Connects a control signal (LFO, ramp) to a parameter of another node:

    modulated_value = base_value + (block_average(modulator) × depth)

  // Bell wobble
  FilterNode::lowpass(2200.0)
      .modulate(LfoNode::sine(0.9), FilterParam::Cutoff, 1200.0)

  // Downward damping sweep, 5000 Hz → 1200 Hz
  FilterNode::lowpass(1200.0)
      .modulate(RampNode::new(1.4), FilterParam::Cutoff, 3800.0)

The modulator is averaged over each block and applied before the source
renders that block. See `dsp/modulate.rs` for the control-rate tradeoff.
*/

pub struct Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    source: S,
    lfo: L,
    param: S::Param,
    depth: f32,
    lfo_buffer: Vec<f32>,
}

impl<S, L> Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    pub fn new(source: S, lfo: L, param: S::Param, depth: f32) -> Self {
        Self {
            source,
            lfo,
            param,
            depth,
            lfo_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, L> GraphNode for Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();
        self.lfo.render_block(&mut self.lfo_buffer[..len], ctx);

        let base_value = self.source.get_param(self.param);
        let modulated = apply_modulation(base_value, block_average(&self.lfo_buffer[..len]), self.depth);
        self.source
            .apply_modulation(self.param, base_value, modulated - base_value);

        self.source.render_block(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.lfo.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source.note_off(ctx);
        self.lfo.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.source.is_active()
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.source.get_envelope_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        extensions::NodeExt,
        filter::{FilterNode, FilterParam},
        lfo::LfoNode,
        ramp::RampNode,
    };

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(48_000.0, 440.0, 1.0)
    }

    #[test]
    fn ramp_sweeps_cutoff_downward() {
        let ctx = ctx();
        let mut filter = FilterNode::lowpass(1_200.0).modulate(RampNode::new(0.05), FilterParam::Cutoff, 3_800.0);
        filter.note_on(&ctx);

        let mut buffer = vec![0.0; 64];
        filter.render_block(&mut buffer, &ctx);
        let early = filter.source().effective_cutoff();

        for _ in 0..100 {
            filter.render_block(&mut buffer, &ctx);
        }
        let late = filter.source().effective_cutoff();

        assert!(early > 4_500.0, "sweep should start near 5 kHz, got {early}");
        assert!(late < 1_210.0, "sweep should settle near 1.2 kHz, got {late}");
        assert_eq!(filter.source().get_param(FilterParam::Cutoff), 1_200.0);
    }

    #[test]
    fn extreme_depth_stays_finite() {
        let mut filter = FilterNode::lowpass(1_000.0).modulate(LfoNode::sine(1.0), FilterParam::Cutoff, 100_000.0);
        let mut buffer = vec![0.3; 1024];
        filter.render_block(&mut buffer, &ctx());

        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
