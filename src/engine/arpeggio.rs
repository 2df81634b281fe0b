//! Turning activation vectors into timed note sequences.

use rand::{seq::SliceRandom, Rng};

use crate::config::Span;

/// One vector entry above threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveNote {
    pub index: usize,
    pub amplitude: f32,
}

/// Every entry strictly above `threshold`, in index order.
pub fn active_notes(values: &[f32], threshold: f32) -> Vec<ActiveNote> {
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > threshold)
        .map(|(index, &amplitude)| ActiveNote { index, amplitude })
        .collect()
}

/// The `count` loudest active notes, loudest first. Ties keep index order.
pub fn strongest(mut notes: Vec<ActiveNote>, count: usize) -> Vec<ActiveNote> {
    notes.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
    notes.truncate(count);
    notes
}

/// Highest value in the vector, 0.0 when empty.
pub fn peak(values: &[f32]) -> f32 {
    values.iter().copied().fold(0.0, f32::max)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArpeggioStep {
    /// Seconds after the arpeggio starts
    pub delay: f64,
    pub note: ActiveNote,
}

/// Build a complete arpeggio up front.
///
/// The note set is repeated `repetitions` times, each repetition shuffled
/// independently, and the repetitions concatenated. Delays start at 0 and
/// grow by `step × jitter` per note, with jitter drawn per step, so the
/// sequence is non-decreasing and `repetitions × notes.len()` long.
pub fn build_arpeggio<R: Rng + ?Sized>(
    notes: &[ActiveNote],
    repetitions: u32,
    step: f32,
    jitter: Span,
    rng: &mut R,
) -> Vec<ArpeggioStep> {
    let mut steps = Vec::with_capacity(notes.len() * repetitions as usize);
    let mut delay = 0.0_f64;

    for _ in 0..repetitions {
        let mut order = notes.to_vec();
        order.shuffle(rng);

        for note in order {
            steps.push(ArpeggioStep { delay, note });
            delay += f64::from(step * jitter.sample(rng));
        }
    }

    steps
}
