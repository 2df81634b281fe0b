use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Envelope Generators
===================

Two shapes cover every voice in the catalog.

Sustained: linear ADSR
----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Used by pads and the detuned ensemble. The gate (note_on / note_off) decides
how long the sustain holds; the owning voice instance closes the gate after
its hold time, so the envelope always reaches Idle on its own.

  increment = 1.0 / (attack_seconds * sample_rate)

Release snapshots the level at note_off and interpolates to exactly 0.0 over
a precomputed number of samples, so releasing mid-attack never clicks.

Struck: percussive (attack + exponential decay)
-----------------------------------------------

  Level
    1.0 ┐ ╱╲
        │╱  ╲_
        │     ‾‾──___
    0.0 └──────────────‾‾‾──→ Time
       Attack   Decay (-60 dB at decay_time)

Used by the bell and harp. There is no sustain and no gate: after the linear
attack the level is multiplied every sample by a fixed coefficient

  coefficient = 0.001 ^ (1 / (decay_seconds * sample_rate))

which lands on -60 dB (0.001) exactly `decay_seconds` after the peak. At that
point the envelope snaps to zero and goes Idle, which is what lets a struck
voice dispose itself without any external timer.
*/

/// Level at which a percussive decay is considered finished (-60 dB).
pub const SILENCE_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Ramping up to 1.0
    Decay,   // Falling from the peak
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    decay_start_level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),
            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: start the attack phase from zero.
    pub fn note_on(&mut self, _ctx: &RenderCtx) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release phase from the current level.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * ctx.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }
            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * ctx.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                self.level -= total_drop / (self.decay_time * ctx.sample_rate);
                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }
            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);
                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

/// Linear attack followed by an exponential decay to silence.
pub struct PercEnvelope {
    attack_time: f32,
    decay_time: f32,
    stage: EnvelopeState,
    level: f32,
    coefficient: f32,
}

impl PercEnvelope {
    pub fn new(attack: f32, decay: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            stage: EnvelopeState::Idle,
            level: 0.0,
            coefficient: 0.0,
        }
    }

    pub fn note_on(&mut self, ctx: &RenderCtx) {
        self.level = 0.0;
        self.coefficient = SILENCE_FLOOR.powf(1.0 / (self.decay_time * ctx.sample_rate));
        self.stage = EnvelopeState::Attack;
    }

    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        match self.stage {
            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * ctx.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                self.level *= self.coefficient;
                if self.level <= SILENCE_FLOOR {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
            _ => {
                self.level = 0.0;
                self.stage = EnvelopeState::Idle;
            }
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    /// Seconds from note_on until the envelope goes idle.
    pub fn duration(&self) -> f32 {
        self.attack_time + self.decay_time
    }
}
