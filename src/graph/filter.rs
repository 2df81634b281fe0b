use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
Filter Node
===========

Wraps the state-variable filter as a graph node so it can sit in a chain
with `.through()` and have its cutoff driven by `.modulate()`.

  // Softened pad
  OscNode::triangle().through(FilterNode::lowpass(1100.0))

  // Bell wobble: resonant low-pass swept by a slow sine LFO
  FilterNode::lowpass(2200.0)
      .with_resonance(0.55)
      .modulate(LfoNode::sine(0.9), FilterParam::Cutoff, 1200.0)

  // Harp damping: cutoff glides 5 kHz → 1.2 kHz over the note
  FilterNode::lowpass(1200.0)
      .modulate(RampNode::new(1.4), FilterParam::Cutoff, 3800.0)

The node remembers its base cutoff so modulation is always relative to the
configured center, never to the previous block's modulated value.
*/

#[derive(Clone, Copy, Debug)]
pub enum FilterParam {
    Cutoff,
    Resonance,
}

pub struct FilterNode {
    filter: SVFilter,
    base_cutoff: f32,
    base_resonance: f32,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::lowpass(cutoff_hz),
            base_cutoff: cutoff_hz,
            base_resonance: 0.0,
        }
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::highpass(cutoff_hz),
            base_cutoff: cutoff_hz,
            base_resonance: 0.0,
        }
    }

    pub fn with_resonance(mut self, resonance: f32) -> Self {
        self.base_resonance = resonance;
        self.filter.set_resonance(resonance);
        self
    }

    /// Cutoff currently applied to the filter, after modulation.
    pub fn effective_cutoff(&self) -> f32 {
        self.filter.cutoff()
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.base_cutoff,
            FilterParam::Resonance => self.base_resonance,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        let final_value = base + modulation;
        match param {
            FilterParam::Cutoff => {
                self.base_cutoff = base;
                self.filter.set_cutoff(final_value.clamp(20.0, 20_000.0));
            }
            FilterParam::Resonance => {
                self.base_resonance = base;
                self.filter.set_resonance(final_value);
            }
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulation_keeps_base_cutoff() {
        let mut filter = FilterNode::lowpass(1_000.0);
        filter.apply_modulation(FilterParam::Cutoff, 1_000.0, 500.0);

        assert_eq!(filter.get_param(FilterParam::Cutoff), 1_000.0);
        assert_eq!(filter.effective_cutoff(), 1_500.0);
    }

    #[test]
    fn modulated_cutoff_is_clamped() {
        let mut filter = FilterNode::lowpass(1_000.0);
        filter.apply_modulation(FilterParam::Cutoff, 1_000.0, -5_000.0);

        assert_eq!(filter.effective_cutoff(), 20.0);
    }
}
