use crate::{
    dsp::envelope::{Envelope, PercEnvelope},
    graph::node::{GraphNode, RenderCtx},
};

enum Shape {
    Adsr(Envelope),
    Perc(PercEnvelope),
}

/// Envelope generator node.
///
/// Renders its level (0.0 - 1.0) into the buffer, overwriting it. Use it as
/// the modulator of `.amplify()` to gate a source.
pub struct EnvNode {
    shape: Shape,
}

impl EnvNode {
    /// Sustained envelope; releases when the voice closes its gate.
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            shape: Shape::Adsr(Envelope::adsr(attack, decay, sustain, release)),
        }
    }

    /// Struck envelope; fades to silence on its own, ignores note-off.
    pub fn perc(attack: f32, decay: f32) -> Self {
        Self {
            shape: Shape::Perc(PercEnvelope::new(attack, decay)),
        }
    }

    pub fn level(&self) -> f32 {
        match &self.shape {
            Shape::Adsr(env) => env.level(),
            Shape::Perc(env) => env.level(),
        }
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        match &mut self.shape {
            Shape::Adsr(env) => env.render(out, ctx),
            Shape::Perc(env) => env.render(out, ctx),
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        match &mut self.shape {
            Shape::Adsr(env) => env.note_on(ctx),
            Shape::Perc(env) => env.note_on(ctx),
        }
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        if let Shape::Adsr(env) = &mut self.shape {
            env.note_off(ctx);
        }
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.level())
    }

    fn is_active(&self) -> bool {
        match &self.shape {
            Shape::Adsr(env) => env.is_active(),
            Shape::Perc(env) => env.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(1_000.0, 440.0, 1.0)
    }

    #[test]
    fn idle_until_note_on() {
        let env = EnvNode::adsr(0.01, 0.1, 0.7, 0.2);
        assert!(!env.is_active());
    }

    #[test]
    fn perc_ignores_note_off() {
        let mut env = EnvNode::perc(0.001, 1.0);
        let ctx = ctx();
        env.note_on(&ctx);

        let mut buffer = vec![0.0; 10];
        env.render_block(&mut buffer, &ctx);
        env.note_off(&ctx);
        env.render_block(&mut buffer, &ctx);

        assert!(env.is_active());
        assert!(env.level() > 0.5);
    }

    #[test]
    fn adsr_goes_idle_after_release() {
        let mut env = EnvNode::adsr(0.01, 0.01, 0.8, 0.05);
        let ctx = ctx();
        env.note_on(&ctx);

        let mut buffer = vec![0.0; 40];
        env.render_block(&mut buffer, &ctx);
        env.note_off(&ctx);
        let mut tail = vec![0.0; 60];
        env.render_block(&mut tail, &ctx);

        assert!(!env.is_active());
        assert_eq!(tail[59], 0.0);
    }
}
