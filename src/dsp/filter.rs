use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
Topology-Preserving State-Variable Filter
=========================================

One trapezoidal-integrated SVF gives both responses the voices need:

| response  | passes       | voice use                               |
| --------- | ------------ | --------------------------------------- |
| low-pass  | below cutoff | every voice (softening, swept damping)  |
| high-pass | above cutoff | harp (clears rumble before the sweep)   |

  g = tan(π · cutoff / sample_rate)
  k = 2 - 2 · resonance          (resonance 0 → k = 2, Butterworth-ish Q = 0.5)

Per sample:

  h  = 1 / (1 + g·(g + k))
  v1 = h · (ic1 + g·(x - ic2))      band-pass
  v2 = ic2 + g·v1                   low-pass
  hp = x - k·v1 - v2                high-pass
  ic1 = 2·v1 - ic1
  ic2 = 2·v2 - ic2

The cutoff is clamped below Nyquist before `tan` so a swept or wobbling
cutoff can never push `g` to infinity. Resonance is clamped just under 1.0
(k stays positive) so the bell's resonant peak rings without self-oscillating.
*/

const MAX_RESONANCE: f32 = 0.98;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,

    cutoff_hz: f32,
    resonance: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            resonance: 0.0,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz)
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        let nyquist_guard = ctx.sample_rate * 0.49;
        let cutoff = self.cutoff_hz.clamp(10.0, nyquist_guard);
        (PI * cutoff / ctx.sample_rate).tan()
    }

    #[inline]
    fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v1 = h * (self.ic1eq + g * (sample - self.ic2eq));
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.filter_type {
            FilterType::LowPass => v2,
            FilterType::HighPass => sample - k * v1 - v2,
        }
    }

    /// Filter the buffer in place.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = 2.0 - 2.0 * self.resonance;

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, MAX_RESONANCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    fn sine_through(filter: &mut SVFilter, frequency: f32) -> f32 {
        let ctx = RenderCtx::from_freq(48_000.0, frequency, 1.0);
        let mut buffer = vec![0.0f32; 2048];
        OscillatorBlock::sine().render(&mut buffer, &ctx);
        filter.render(&mut buffer, &ctx);

        // Skip the transient
        buffer[512..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 512];
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

        filter.render(&mut buffer, &ctx);

        assert!(buffer[511] > 0.99);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filter = SVFilter::highpass(500.0);
        let mut buffer = vec![1.0; 512];
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

        filter.render(&mut buffer, &ctx);

        assert!(buffer[511].abs() < 0.001);
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let low = sine_through(&mut SVFilter::lowpass(500.0), 100.0);
        let high = sine_through(&mut SVFilter::lowpass(500.0), 5_000.0);

        assert!(low > 0.9, "passband peak {low}");
        assert!(high < 0.05, "stopband peak {high}");
    }

    #[test]
    fn resonance_boosts_the_cutoff() {
        let mut flat = SVFilter::lowpass(1_000.0);
        let mut resonant = SVFilter::lowpass(1_000.0);
        resonant.set_resonance(0.8);

        assert!(sine_through(&mut resonant, 1_000.0) > sine_through(&mut flat, 1_000.0) * 2.0);
    }

    #[test]
    fn cutoff_above_nyquist_stays_finite() {
        let mut filter = SVFilter::lowpass(90_000.0);
        let mut buffer = vec![0.5; 256];
        filter.render(&mut buffer, &RenderCtx::from_freq(48_000.0, 440.0, 1.0));

        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
