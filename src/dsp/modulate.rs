//! Parameter modulation primitives.

/*
Block-Rate Parameter Modulation
===============================

    modulated_value = base_value + (modulator × depth)

The voices use two shapes of modulator on filter cutoff:

  wobble   bipolar LFO around a center:   base 2200 Hz, depth 1200 Hz
           → cutoff sweeps 1000 … 3400 Hz (the bell)

  sweep    unipolar ramp falling 1 → 0:   base = end cutoff,
           depth = start - end
           → cutoff glides from start down to end (harp, ensemble)

Modulation is applied once per block using the modulator's block average.
At 48 kHz and 128-512 sample blocks that is a 94-375 Hz control rate, far
faster than any sweep or wobble here, and it keeps the filter coefficient
update out of the per-sample loop.
*/

/// The modulated parameter value: base + (modulator × depth).
#[inline]
pub fn apply_modulation(base_value: f32, modulator: f32, depth: f32) -> f32 {
    base_value + (modulator * depth)
}

/// Average of a modulator signal over a block.
#[inline]
pub fn block_average(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_modulation_center() {
        assert_eq!(apply_modulation(1000.0, 0.0, 500.0), 1000.0);
    }

    #[test]
    fn test_apply_modulation_sweep_endpoints() {
        // Sweep from 5000 Hz down to 1200 Hz
        assert_eq!(apply_modulation(1200.0, 1.0, 3800.0), 5000.0);
        assert_eq!(apply_modulation(1200.0, 0.0, 3800.0), 1200.0);
    }

    #[test]
    fn test_block_average() {
        assert_eq!(block_average(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_block_average_empty() {
        let samples: [f32; 0] = [];
        assert_eq!(block_average(&samples), 0.0);
    }
}
