//! Pitch mapping: scale quantization, note numbers, digit table.
//!
//! Everything here sits on the scheduling hot path and never fails: indices
//! outside a table fall back to offset 0, notes outside the playable range
//! are clamped.

/// Lowest playable note (C1).
pub const MIN_NOTE: i32 = 24;
/// Highest playable note (C7).
pub const MAX_NOTE: i32 = 96;
/// Tuning reference note (A4).
pub const A4_NOTE: i32 = 69;
pub const A4_HZ: f32 = 440.0;

/// Natural minor, as semitone degrees within the octave.
pub const NATURAL_MINOR: &[u8] = &[0, 2, 3, 5, 7, 8, 10];

/// Root of the digit table (A3).
pub const DIGIT_ROOT: i32 = 57;

/// Semitone offset of each digit 0-9 above the root: ten distinct steps of
/// the natural minor scale, one octave and a minor third.
pub const DIGIT_OFFSETS: [i32; 10] = [0, 2, 3, 5, 7, 8, 10, 12, 14, 15];

/// Snap `raw` to the nearest degree of `degrees` within the same octave.
///
/// Octave and degree come from Euclidean division, so negative inputs still
/// land on a degree in `degrees`. Ties go to the degree listed first. An
/// empty scale returns `raw` untouched.
pub fn quantize_to_scale(raw: i32, degrees: &[u8]) -> i32 {
    let octave = raw.div_euclid(12);
    let degree = raw.rem_euclid(12);

    let mut best: Option<(i32, i32)> = None;
    for &candidate in degrees {
        let candidate = i32::from(candidate);
        let distance = (degree - candidate).abs();
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    match best {
        Some((snapped, _)) => octave * 12 + snapped,
        None => raw,
    }
}

/// 12-TET frequency of `note`, clamped to [`MIN_NOTE`, `MAX_NOTE`].
pub fn note_to_frequency(note: i32) -> f32 {
    let note = note.clamp(MIN_NOTE, MAX_NOTE);
    A4_HZ * 2.0_f32.powf((note - A4_NOTE) as f32 / 12.0)
}

/// Note number for a classifier digit at an octave offset from the root.
pub fn digit_to_note(digit: usize, octave: i32) -> i32 {
    let offset = DIGIT_OFFSETS.get(digit).copied().unwrap_or(0);
    DIGIT_ROOT + 12 * octave + offset
}

pub fn digit_to_frequency(digit: usize, octave: i32) -> f32 {
    note_to_frequency(digit_to_note(digit, octave))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_exactly_440() {
        assert_eq!(note_to_frequency(69), 440.0);
    }

    #[test]
    fn octave_doubles_frequency() {
        assert!((note_to_frequency(81) - 880.0).abs() < 1e-3);
        assert!((note_to_frequency(57) - 220.0).abs() < 1e-3);
    }

    #[test]
    fn frequency_is_monotonic_and_clamped() {
        let mut previous = 0.0;
        for note in MIN_NOTE..=MAX_NOTE {
            let f = note_to_frequency(note);
            assert!(f > previous, "not increasing at {note}");
            previous = f;
        }

        for note in [-100, 0, 23] {
            assert_eq!(note_to_frequency(note), note_to_frequency(MIN_NOTE));
        }
        for note in [97, 127, 10_000] {
            assert_eq!(note_to_frequency(note), note_to_frequency(MAX_NOTE));
        }
    }

    #[test]
    fn quantized_degree_is_always_in_scale() {
        let scales: [&[u8]; 3] = [NATURAL_MINOR, &[0, 4, 7], &[11]];
        for scale in scales {
            for n in -40..200 {
                let q = quantize_to_scale(n, scale);
                assert!(
                    scale.contains(&(q.rem_euclid(12) as u8)),
                    "{n} → {q} not in {scale:?}"
                );
            }
        }
    }

    #[test]
    fn quantize_keeps_octave_and_picks_nearest() {
        // C# in C major triad → C (distance 1) beats E (distance 3)
        assert_eq!(quantize_to_scale(61, &[0, 4, 7]), 60);
        // F# is 2 from E and 1 from G
        assert_eq!(quantize_to_scale(66, &[0, 4, 7]), 67);
        // E is 1 from both 3 and 5; 3 is listed first
        assert_eq!(quantize_to_scale(64, NATURAL_MINOR), 63);
        // in-scale notes are unchanged
        assert_eq!(quantize_to_scale(65, NATURAL_MINOR), 65);
    }

    #[test]
    fn quantize_ties_go_to_first_listed_degree() {
        // degree 2 is equidistant from 0 and 4
        assert_eq!(quantize_to_scale(2, &[0, 4]), 0);
        assert_eq!(quantize_to_scale(2, &[4, 0]), 4);
    }

    #[test]
    fn quantize_handles_negative_and_empty() {
        assert_eq!(quantize_to_scale(-1, &[0, 7]), -5);
        assert_eq!(quantize_to_scale(42, &[]), 42);
    }

    #[test]
    fn digit_table_has_no_duplicates() {
        let mut notes: Vec<i32> = (0..10).map(|d| digit_to_note(d, 0)).collect();
        notes.dedup();
        assert_eq!(notes.len(), 10);
        assert!(notes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn out_of_range_digit_falls_back_to_root() {
        assert_eq!(digit_to_note(42, 1), DIGIT_ROOT + 12);
        assert!((digit_to_frequency(0, 0) - 220.0).abs() < 1e-3);
    }
}
