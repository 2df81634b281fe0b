use crate::{
    graph::node::{GraphNode, RenderCtx},
    voices::{VoiceKind, VoicePatch},
    MAX_BLOCK_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Sounding,  // Gate open
    Releasing, // Gate closed, graph still ringing out
    Disposed,  // Finished or force-stopped; the bank drops it next block
}

/// One played note: a voice graph plus its playback bookkeeping.
///
/// Built on the control side and handed to the render side whole, so the
/// audio thread never allocates a graph. The instance closes its own gate
/// after the patch's hold time and disposes itself when the graph reports
/// inactive, or at the hard lifetime cap, whichever comes first.
pub struct VoiceInstance {
    kind: VoiceKind,
    frequency: f32,
    amplitude: f32,
    sample_rate: f32,
    graph: Box<dyn GraphNode>,
    state: VoiceState,
    elapsed_samples: u64,
    gate_samples: u64,
    max_samples: u64,
    /// Stop epoch current when the voice was sent
    epoch: u64,
}

impl VoiceInstance {
    pub fn new(
        kind: VoiceKind,
        patch: VoicePatch,
        frequency: f32,
        amplitude: f32,
        sample_rate: f32,
    ) -> Self {
        let gate_samples = (patch.hold.max(0.0) * sample_rate) as u64;
        let max_samples = (patch.lifetime() * sample_rate).ceil() as u64;
        let mut graph = patch.graph;

        let ctx = RenderCtx::from_freq(sample_rate, frequency, amplitude);
        graph.note_on(&ctx);

        Self {
            kind,
            frequency,
            amplitude,
            sample_rate,
            graph,
            state: VoiceState::Sounding,
            elapsed_samples: 0,
            gate_samples,
            max_samples,
            epoch: 0,
        }
    }

    /// Mark the voice as sent during stop epoch `epoch`.
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Render the next block into `out`, overwriting it. Any length works;
    /// graphs only ever see up to `MAX_BLOCK_SIZE` samples at a time.
    pub fn render(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk);
        }
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        if self.state == VoiceState::Disposed {
            out.fill(0.0);
            return;
        }

        let ctx = RenderCtx::from_freq(self.sample_rate, self.frequency, self.amplitude);
        let len = out.len() as u64;

        // Split the block where the gate closes so note_off lands on its sample
        let split = match self.state {
            VoiceState::Sounding => self.gate_samples.saturating_sub(self.elapsed_samples).min(len),
            _ => len,
        } as usize;
        let (before, after) = out.split_at_mut(split);

        if !before.is_empty() {
            self.graph.render_block(before, &ctx);
        }
        if self.state == VoiceState::Sounding
            && self.elapsed_samples + split as u64 >= self.gate_samples
        {
            self.graph.note_off(&ctx);
            self.state = VoiceState::Releasing;
        }
        if !after.is_empty() {
            self.graph.render_block(after, &ctx);
        }

        for sample in out.iter_mut() {
            *sample *= self.amplitude;
        }

        self.elapsed_samples += len;
        if !self.graph.is_active() || self.elapsed_samples >= self.max_samples {
            self.dispose();
        }
    }

    /// Force-stop. Idempotent.
    pub fn dispose(&mut self) {
        self.state = VoiceState::Disposed;
    }

    pub fn is_disposed(&self) -> bool {
        self.state == VoiceState::Disposed
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn kind(&self) -> VoiceKind {
        self.kind
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
}
