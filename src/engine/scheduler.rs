//! One-shot note triggers on simulated time.
//!
//! Triggers sit in a min-heap ordered by `(fire_at, id)`: earliest first, and
//! creation order among triggers due at the same instant. The only
//! cancellation is total (`clear_all`); nothing in this domain ever needs to
//! cancel a single note.
//!
//! Every trigger ever created is in exactly one of pending, fired or
//! cancelled, and the counters below always add up:
//!
//!   created == pending + fired + cancelled

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::voices::VoiceKind;

/// Creation-order handle of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(pub u64);

#[derive(Debug, Clone, Copy)]
pub struct ScheduledTrigger {
    pub id: TriggerId,
    /// Absolute seconds on the engine clock
    pub fire_at: f64,
    pub frequency: f32,
    pub amplitude: f32,
    pub kind: VoiceKind,
}

// Min-heap: Rust's BinaryHeap is a max-heap, so the ordering is reversed.
impl PartialEq for ScheduledTrigger {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledTrigger {}

impl PartialOrd for ScheduledTrigger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTrigger {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .total_cmp(&self.fire_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug, Default)]
pub struct NoteScheduler {
    heap: BinaryHeap<ScheduledTrigger>,
    next_id: u64,
    fired: u64,
    cancelled: u64,
}

impl NoteScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a note to fire `delay` seconds after `now`.
    ///
    /// Negative or non-finite delays fire on the next drain.
    pub fn schedule_note(
        &mut self,
        now: f64,
        frequency: f32,
        amplitude: f32,
        delay: f64,
        kind: VoiceKind,
    ) -> TriggerId {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        let id = TriggerId(self.next_id);
        self.next_id += 1;

        self.heap.push(ScheduledTrigger {
            id,
            fire_at: now + delay,
            frequency,
            amplitude,
            kind,
        });
        id
    }

    /// Cancel every pending trigger. Returns how many were cancelled.
    pub fn clear_all(&mut self) -> usize {
        let count = self.heap.len();
        self.heap.clear();
        self.cancelled += count as u64;
        count
    }

    /// Pop the next trigger if it is due at `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<ScheduledTrigger> {
        if self.heap.peek().is_some_and(|t| t.fire_at <= now) {
            self.fired += 1;
            self.heap.pop()
        } else {
            None
        }
    }

    /// Every trigger due at `now`, in firing order.
    pub fn drain_due(&mut self, now: f64) -> Vec<ScheduledTrigger> {
        std::iter::from_fn(|| self.pop_due(now)).collect()
    }

    /// When the earliest pending trigger fires.
    pub fn next_fire_at(&self) -> Option<f64> {
        self.heap.peek().map(|t| t.fire_at)
    }

    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    pub fn created(&self) -> u64 {
        self.next_id
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}
