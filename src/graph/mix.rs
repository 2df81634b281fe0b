use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Parallel Signal Mixing
======================

Mix renders two sources and crossfades them linearly:

  output = A × (1 - balance) + B × balance

  balance = 0.0 → all A
  balance = 0.5 → equal mix
  balance = 1.0 → all B

Chaining mixes builds stacks of more than two generators. Each later mix
scales everything before it by (1 - balance), so a harmonic stack reads:

  OscNode::sine()                                  // fundamental
      .mix(OscNode::sine().with_ratio(2.01), 0.3)  // 70% / 30%

Both sources receive note_on/note_off. A mix keeps sounding while either
side does, which lets independently-enveloped partials (the harp) decay at
their own rates and the voice end only when the longest one has.
*/

pub struct Mix<A, B> {
    pub source_a: A,
    pub source_b: B,
    pub balance: f32, // 0.0 = all A, 1.0 = all B, 0.5 = equal mix
    temp_buffer: Vec<f32>,
}

impl<A, B> Mix<A, B> {
    pub fn new(source_a: A, source_b: B, balance: f32) -> Self {
        Mix {
            source_a,
            source_b,
            balance: balance.clamp(0.0, 1.0),
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<S: GraphNode, M: GraphNode> GraphNode for Mix<S, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source_a.render_block(out, ctx);

        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);
        self.source_b.render_block(frames, ctx);

        let weight_a = 1.0 - self.balance;
        let weight_b = self.balance;
        for (o, b) in out.iter_mut().zip(frames.iter()) {
            *o = (*o * weight_a) + (*b * weight_b);
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source_a.note_on(ctx);
        self.source_b.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source_a.note_off(ctx);
        self.source_b.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.source_a.is_active() || self.source_b.is_active()
    }

    fn get_envelope_level(&self) -> Option<f32> {
        match (
            self.source_a.get_envelope_level(),
            self.source_b.get_envelope_level(),
        ) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode};

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(48_000.0, 440.0, 1.0)
    }

    #[test]
    fn test_mix_all_source_a() {
        let mut mixed = OscNode::sine().mix(OscNode::square(), 0.0);
        let mut reference = OscNode::sine();

        let mut buffer = vec![0.0; 256];
        let mut expected = vec![0.0; 256];
        mixed.render_block(&mut buffer, &ctx());
        reference.render_block(&mut expected, &ctx());

        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_mix_output_range() {
        let mut mixed = OscNode::sine().mix(OscNode::sawtooth(), 0.5);
        let mut buffer = vec![0.0; 1024];
        mixed.render_block(&mut buffer, &ctx());

        assert!(buffer.iter().all(|s| s.abs() <= 1.0 && s.is_finite()));
    }

    #[test]
    fn test_mix_active_until_longest_partial_ends() {
        let ctx = ctx();
        let mut mixed = OscNode::sine()
            .amplify(EnvNode::perc(0.001, 0.01))
            .mix(OscNode::sine().amplify(EnvNode::perc(0.001, 0.2)), 0.5);
        mixed.note_on(&ctx);

        let mut buffer = vec![0.0; 2048];
        mixed.render_block(&mut buffer, &ctx);
        assert!(mixed.is_active(), "long partial still ringing");

        for _ in 0..5 {
            mixed.render_block(&mut buffer, &ctx);
        }
        assert!(!mixed.is_active());
    }
}
