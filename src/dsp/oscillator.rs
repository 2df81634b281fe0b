#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;

use crate::graph::node::RenderCtx;

/*
Phase-Accumulator Oscillator
============================

Every waveform here is a function of a single normalized phase in [0, 1).
Each sample the phase advances by `frequency / sample_rate` and wraps:

    phase += f / sr
    if phase >= 1.0 { phase -= 1.0 }

The waveform then maps phase to amplitude:

  Sine      sin(2π·phase)
  Saw       2·phase - 1                 (rising ramp, -1 → +1)
  Square    +1 for phase < 0.5, else -1
  Triangle  1 - 4·|phase - 0.5|          (-1 at 0, +1 at 0.5, -1 at 1)

The naive saw and square alias above a few kHz. The voices in this crate run
them through low-pass filters well below Nyquist, so the aliasing stays
inaudible and the oscillator remains branch-light and allocation-free.

The phase is kept across blocks so consecutive render calls produce one
continuous waveform. `set_phase()` restarts it for a clean note start.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
    Square,
    Triangle,
}

pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(OscillatorWaveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    /// Start from an arbitrary phase (wrapped into [0, 1)).
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.rem_euclid(1.0);
    }

    #[inline]
    fn shape(&self) -> f32 {
        let p = self.phase;
        match self.waveform {
            OscillatorWaveform::Sine => (TAU * p).sin(),
            OscillatorWaveform::Saw => 2.0 * p - 1.0,
            OscillatorWaveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
        }
    }

    /// Fill the buffer with the waveform at `ctx.frequency`.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let increment = (ctx.frequency / ctx.sample_rate).clamp(0.0, 0.5);

        for sample in out.iter_mut() {
            *sample = self.shape();
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }
}
