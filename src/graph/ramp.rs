use crate::{
    dsp::envelope::SILENCE_FLOOR,
    graph::node::{GraphNode, RenderCtx},
    MIN_TIME,
};

/// One-way exponential ramp from 1.0 down towards 0.0, restarted on note-on.
///
/// Reaches -60 dB after `time` seconds and stays there. Drives downward
/// cutoff sweeps through `.modulate()`, where `base` is the end cutoff and
/// `depth` is the distance from the start cutoff.
pub struct RampNode {
    time: f32,
    level: f32,
    coefficient: f32,
}

impl RampNode {
    pub fn new(time: f32) -> Self {
        Self {
            time: time.max(MIN_TIME),
            level: 1.0,
            coefficient: 1.0,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

impl GraphNode for RampNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if self.coefficient >= 1.0 {
            self.coefficient = SILENCE_FLOOR.powf(1.0 / (self.time * ctx.sample_rate));
        }

        for sample in out.iter_mut() {
            *sample = self.level;
            self.level = (self.level * self.coefficient).max(SILENCE_FLOOR);
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.level = 1.0;
        self.coefficient = SILENCE_FLOOR.powf(1.0 / (self.time * ctx.sample_rate));
    }
}
