//! Low Frequency Oscillator (LFO) helpers.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at control rate (roughly 0.01 Hz to 20 Hz).
It is never heard directly; it moves a parameter over time.

  bipolar     swings -1.0 … +1.0, for parameters that move around a center
              (the bell's filter wobble)
  unipolar    stays in 0.0 … 1.0, for parameters that only dip one way
              (the bloom shimmer, which only ever darkens the envelope)

  unipolar = (bipolar + 1) / 2

The bloom estimator has no sample clock: it is sampled once per animation
frame from wall time. `triangle_unipolar` evaluates a triangle directly from
a phase expressed in cycles, so the shimmer stays frame-rate independent.
*/

/// Unipolar triangle evaluated at `cycles` (any real number of cycles).
///
/// 0.0 at whole cycles, 1.0 at half cycles.
#[inline]
pub fn triangle_unipolar(cycles: f64) -> f32 {
    let frac = cycles.rem_euclid(1.0) as f32;
    1.0 - (2.0 * frac - 1.0).abs()
}
