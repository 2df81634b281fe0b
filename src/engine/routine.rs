//! Periodic ambient routines as explicit state machines.
//!
//!   Stopped ──start──→ Scheduled ──due──→ Firing ──rearm──→ Scheduled
//!      ↑                    │                                   │
//!      └────────stop────────┴───────────────stop────────────────┘
//!
//! The engine's `tick` owns the loop: it asks each routine whether it is
//! due, does the routine's work, then re-arms it with a fresh random
//! interval. Stopping clears the next-fire time, so a stopped routine can
//! never fire again until it is restarted.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    /// Pad chords from the first hidden layer
    Pad,
    /// Bell notes from the second hidden layer
    Lead,
    /// Harp arpeggios from the output layer
    Arpeggio,
}

impl RoutineKind {
    pub const ALL: [RoutineKind; 3] = [RoutineKind::Pad, RoutineKind::Lead, RoutineKind::Arpeggio];

    pub fn name(self) -> &'static str {
        match self {
            RoutineKind::Pad => "pad",
            RoutineKind::Lead => "lead",
            RoutineKind::Arpeggio => "arpeggio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoutineStatus {
    Stopped,
    Scheduled { next_fire_at: f64 },
    Firing,
}

#[derive(Debug, Clone)]
pub struct Routine {
    kind: RoutineKind,
    status: RoutineStatus,
    last_fire_at: Option<f64>,
}

impl Routine {
    pub fn new(kind: RoutineKind) -> Self {
        Self {
            kind,
            status: RoutineStatus::Stopped,
            last_fire_at: None,
        }
    }

    /// Arm the first firing `first_interval` seconds from `now`.
    pub fn start(&mut self, now: f64, first_interval: f64) {
        self.status = RoutineStatus::Scheduled {
            next_fire_at: now + first_interval.max(0.0),
        };
    }

    pub fn stop(&mut self) {
        self.status = RoutineStatus::Stopped;
    }

    pub fn is_due(&self, now: f64) -> bool {
        matches!(self.status, RoutineStatus::Scheduled { next_fire_at } if next_fire_at <= now)
    }

    /// Enter `Firing`. Returns false, changing nothing, unless the routine
    /// is scheduled and due.
    pub fn begin_fire(&mut self, now: f64) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.status = RoutineStatus::Firing;
        true
    }

    /// Record a firing that produced sound. Drives the bloom envelope.
    pub fn mark_fired(&mut self, now: f64) {
        self.last_fire_at = Some(now);
    }

    /// Leave `Firing` for the next interval. Ignored unless firing, so a
    /// routine stopped mid-fire stays stopped.
    pub fn rearm(&mut self, now: f64, interval: f64) {
        if self.status == RoutineStatus::Firing {
            self.status = RoutineStatus::Scheduled {
                next_fire_at: now + interval.max(0.0),
            };
        }
    }

    pub fn kind(&self) -> RoutineKind {
        self.kind
    }

    pub fn status(&self) -> RoutineStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status != RoutineStatus::Stopped
    }

    pub fn next_fire_at(&self) -> Option<f64> {
        match self.status {
            RoutineStatus::Scheduled { next_fire_at } => Some(next_fire_at),
            _ => None,
        }
    }

    pub fn last_fire_at(&self) -> Option<f64> {
        self.last_fire_at
    }
}

/// Interval multiplier for the arpeggio routine.
///
/// A sharp, confident output (peak 1.0) keeps the base interval; a flat one
/// stretches it, bottoming out at a peak of 0.1.
pub fn confidence_multiplier(peak: f32) -> f32 {
    1.0 + (1.0 - peak.max(0.1)) * 4.0
}
