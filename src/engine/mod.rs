//! The sonification engine: the session object that owns the audio output,
//! the ambient routines and every pending note.
//!
//! Everything runs on one control thread, driven by explicit calls with an
//! explicit clock (`now`, in seconds):
//!
//!   activations / chord events ──→ SonificationEngine ──tick(now)──→ AudioContext::play
//!                                     │  routines decide WHEN
//!                                     │  scheduler holds WHAT is pending
//!                                     └─ bloom(now) ──→ renderer
//!
//! The host calls `tick` often (every few milliseconds). Routines that are
//! due fire first, then every due note is played in scheduling order.
//! Disabling cancels all pending notes and stops the routines; only
//! `teardown` (or dropping the engine) closes the output.

pub mod arpeggio;
pub mod bloom;
pub mod routine;
pub mod scheduler;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, info, warn};

use self::{
    arpeggio::{active_notes, build_arpeggio, peak, strongest},
    bloom::BloomFrame,
    routine::{confidence_multiplier, Routine, RoutineKind},
    scheduler::NoteScheduler,
};
use crate::{
    config::EngineConfig,
    error::AudioError,
    io::{ActivationVector, ChordTrigger, InboundEvent, Instrument, TriggerGate},
    pitch::{digit_to_frequency, note_to_frequency, quantize_to_scale},
    synth::context::{AudioContext, ContextFactory, ContextState},
    voices::VoiceKind,
};

/// Snapshot for UI feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub context_state: ContextState,
    pub is_ready: bool,
    pub enabled: bool,
    pub master_volume: f32,
    pub pending_triggers: usize,
    pub running_routines: usize,
    /// Why the last `init_audio` failed, if it did
    pub last_error: Option<AudioError>,
}

pub struct SonificationEngine<F: ContextFactory, R: Rng = StdRng> {
    config: EngineConfig,
    factory: F,
    context: Option<F::Context>,
    last_error: Option<AudioError>,
    enabled: bool,
    master_volume: f32,
    activations: ActivationVector,
    scheduler: NoteScheduler,
    routines: [Routine; 3],
    last_chord_at: Option<f64>,
    gate: TriggerGate,
    rng: R,
    torn_down: bool,
}

impl<F: ContextFactory> SonificationEngine<F, StdRng> {
    pub fn new(config: EngineConfig, factory: F) -> Self {
        Self::with_rng(config, factory, StdRng::from_entropy())
    }
}

impl<F: ContextFactory, R: Rng> SonificationEngine<F, R> {
    pub fn with_rng(config: EngineConfig, factory: F, rng: R) -> Self {
        let enabled = config.enabled;
        let master_volume = config.master_volume.clamp(0.0, 1.0);
        let gate = TriggerGate::new(f64::from(config.chord.rate_limit))
            .with_idle_timeout(f64::from(config.chord.idle_timeout));

        Self {
            config,
            factory,
            context: None,
            last_error: None,
            enabled,
            master_volume,
            activations: ActivationVector::default(),
            scheduler: NoteScheduler::new(),
            routines: RoutineKind::ALL.map(Routine::new),
            last_chord_at: None,
            gate,
            rng,
            torn_down: false,
        }
    }

    /// Create the output context on first use and resume it if needed.
    ///
    /// Call from a genuine user interaction. Failures are recorded in
    /// [`status`](Self::status) rather than returned; retrying is always safe.
    pub fn init_audio(&mut self, now: f64) -> ContextState {
        if self.torn_down {
            debug!("init_audio after teardown ignored");
            return ContextState::Closed;
        }

        let needs_context = self
            .context
            .as_ref()
            .map_or(true, |ctx| ctx.state() == ContextState::Closed);
        if needs_context {
            match self.factory.create() {
                Ok(ctx) => self.context = Some(ctx),
                Err(err) => {
                    warn!(error = %err, "audio context creation failed");
                    self.last_error = Some(err);
                    return ContextState::Failed;
                }
            }
        }

        if let Some(ctx) = self.context.as_mut() {
            if ctx.state() != ContextState::Running {
                if let Err(err) = ctx.resume() {
                    warn!(error = %err, "audio context resume failed");
                    self.last_error = Some(err);
                    return ContextState::Failed;
                }
                info!("audio context running");
            }
        }

        self.last_error = None;
        if self.enabled {
            self.start_routines(now);
        }
        self.context_state()
    }

    /// Turn the whole engine on or off.
    ///
    /// Turning off cancels every pending note and stops every routine; voices
    /// already sounding ring out. Turning on resumes an existing context and
    /// restarts the routines from scratch.
    pub fn set_enabled(&mut self, on: bool, now: f64) {
        if self.torn_down || on == self.enabled {
            return;
        }
        self.enabled = on;

        if on {
            info!("sonification enabled");
            if self.context.is_some() {
                self.init_audio(now);
            }
        } else {
            self.stop_routines();
            let cancelled = self.scheduler.clear_all();
            info!(cancelled, "sonification disabled");
        }
    }

    /// Takes effect on the next scheduling decision; pending notes keep the
    /// volume they were scheduled with.
    pub fn set_master_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Replace the latest classifier output. No history is kept.
    pub fn set_activations(&mut self, activations: ActivationVector) {
        self.activations = activations;
    }

    pub fn handle_event(&mut self, event: InboundEvent, now: f64) {
        match event {
            InboundEvent::Activation(activations) => self.set_activations(activations),
            InboundEvent::Chord(chord) => {
                if self.gate.accept(&chord.participant, now) {
                    self.play_chord(&chord, now);
                }
            }
            InboundEvent::Enable { on } => self.set_enabled(on, now),
            InboundEvent::Volume { value } => self.set_master_volume(value),
            InboundEvent::Leave { participant } => self.participant_left(&participant),
        }
    }

    /// Forget a participant's rate-limit history when they leave.
    pub fn participant_left(&mut self, participant: &str) {
        if self.gate.forget(participant) {
            debug!(participant, "participant left");
        }
    }

    /// Participants the rate limiter currently remembers.
    pub fn tracked_participants(&self) -> usize {
        self.gate.tracked()
    }

    /// Advance to `now`: fire due routines, then play every due note.
    /// Returns how many notes were handed to the context.
    pub fn tick(&mut self, now: f64) -> usize {
        if self.torn_down {
            return 0;
        }
        self.gate.prune(now);
        if !self.enabled {
            return 0;
        }

        for slot in 0..self.routines.len() {
            // Nothing below may run once the engine is off
            if !self.enabled {
                break;
            }
            if !self.routines[slot].begin_fire(now) {
                continue;
            }

            let kind = self.routines[slot].kind();
            if self.fire(kind, now) > 0 {
                self.routines[slot].mark_fired(now);
            }
            let interval = self.next_interval(kind);
            self.routines[slot].rearm(now, interval);
        }

        self.play_due(now)
    }

    /// Play a chord now: sustained instruments stack every active note,
    /// struck ones arpeggiate. Returns how many notes were scheduled.
    pub fn play_chord(&mut self, chord: &ChordTrigger, now: f64) -> usize {
        if self.torn_down || !self.enabled || !self.is_ready() {
            debug!(participant = %chord.participant, "chord ignored, engine not playing");
            return 0;
        }

        let notes = active_notes(&chord.output, self.config.chord.threshold);
        if notes.is_empty() {
            return 0;
        }

        let kind = chord.instrument.voice();
        let gain = self.config.chord.gain * self.master_volume;

        let scheduled = if chord.instrument.plays_simultaneously() {
            for note in &notes {
                let frequency = digit_to_frequency(note.index, chord.octave);
                self.scheduler
                    .schedule_note(now, frequency, note.amplitude * gain, 0.0, kind);
            }
            notes.len()
        } else {
            let shape = &self.config.arpeggio;
            let repetitions = shape.repetitions(&mut self.rng);
            let steps = build_arpeggio(&notes, repetitions, shape.step, shape.jitter, &mut self.rng);
            for step in &steps {
                let frequency = digit_to_frequency(step.note.index, chord.octave);
                self.scheduler.schedule_note(
                    now,
                    frequency,
                    step.note.amplitude * gain,
                    step.delay,
                    kind,
                );
            }
            steps.len()
        };

        info!(
            participant = %chord.participant,
            instrument = chord.instrument.name(),
            notes = scheduled,
            "chord"
        );
        self.last_chord_at = Some(now);
        self.play_due(now);
        scheduled
    }

    /// Chord from the local user, built from the latest output layer.
    pub fn trigger_local_chord(&mut self, instrument: Instrument, octave: i32, now: f64) -> usize {
        let chord = ChordTrigger {
            participant: "local".to_string(),
            output: self.activations.output.clone(),
            instrument,
            octave,
        };
        self.play_chord(&chord, now)
    }

    pub fn bloom(&self, now: f64) -> BloomFrame {
        let latest = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        let hidden = latest(
            self.routine(RoutineKind::Pad).last_fire_at(),
            self.routine(RoutineKind::Lead).last_fire_at(),
        );
        let output = latest(
            self.routine(RoutineKind::Arpeggio).last_fire_at(),
            self.last_chord_at,
        );

        BloomFrame {
            hidden_bloom: bloom::sample(&self.config.bloom, hidden, now),
            output_bloom: bloom::sample(&self.config.bloom, output, now),
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            context_state: self.context_state(),
            is_ready: self.is_ready(),
            enabled: self.enabled,
            master_volume: self.master_volume,
            pending_triggers: self.scheduler.pending(),
            running_routines: self.routines.iter().filter(|r| r.is_running()).count(),
            last_error: self.last_error.clone(),
        }
    }

    /// Cancel everything, force-stop live voices and close the output.
    /// Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.enabled = false;

        self.stop_routines();
        let cancelled = self.scheduler.clear_all();
        if let Some(mut ctx) = self.context.take() {
            ctx.close();
        }
        info!(cancelled, "sonification torn down");
    }

    pub fn context_state(&self) -> ContextState {
        match (&self.context, &self.last_error) {
            (_, Some(_)) => ContextState::Failed,
            (Some(ctx), None) => ctx.state(),
            (None, None) if self.torn_down => ContextState::Closed,
            (None, None) => ContextState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.context_state().is_ready()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn activations(&self) -> &ActivationVector {
        &self.activations
    }

    pub fn scheduler(&self) -> &NoteScheduler {
        &self.scheduler
    }

    pub fn routine(&self, kind: RoutineKind) -> &Routine {
        &self.routines[slot(kind)]
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn start_routines(&mut self, now: f64) {
        for slot in 0..self.routines.len() {
            if self.routines[slot].is_running() {
                continue;
            }
            let kind = self.routines[slot].kind();
            let interval = self.next_interval(kind);
            self.routines[slot].start(now, interval);
            debug!(routine = kind.name(), first_in = interval, "routine started");
        }
    }

    fn stop_routines(&mut self) {
        for routine in &mut self.routines {
            routine.stop();
        }
    }

    fn next_interval(&mut self, kind: RoutineKind) -> f64 {
        let seconds = match kind {
            RoutineKind::Pad => self.config.pad.interval.sample(&mut self.rng),
            RoutineKind::Lead => self.config.lead.interval.sample(&mut self.rng),
            RoutineKind::Arpeggio => {
                let base = self.config.arpeggio.interval.sample(&mut self.rng);
                base * confidence_multiplier(peak(&self.activations.output))
            }
        };
        f64::from(seconds)
    }

    /// One routine firing. Returns how many notes it scheduled.
    fn fire(&mut self, kind: RoutineKind, now: f64) -> usize {
        let master = self.master_volume;
        let scale = &self.config.scale;

        match kind {
            RoutineKind::Pad => {
                let pad = &self.config.pad;
                let notes = strongest(
                    active_notes(&self.activations.hidden1, pad.threshold),
                    pad.max_notes,
                );
                for note in &notes {
                    let pitch = quantize_to_scale(note.index as i32 + pad.note_offset, scale);
                    self.scheduler.schedule_note(
                        now,
                        note_to_frequency(pitch),
                        note.amplitude * pad.gain * master,
                        0.0,
                        VoiceKind::Pad,
                    );
                }
                notes.len()
            }
            RoutineKind::Lead => {
                let lead = &self.config.lead;
                let notes = active_notes(&self.activations.hidden2, lead.threshold);
                let Some(note) = notes.choose(&mut self.rng) else {
                    return 0;
                };
                let pitch = quantize_to_scale(note.index as i32 + lead.note_offset, scale);
                self.scheduler.schedule_note(
                    now,
                    note_to_frequency(pitch),
                    note.amplitude * lead.gain * master,
                    0.0,
                    VoiceKind::Bell,
                );
                1
            }
            RoutineKind::Arpeggio => {
                let shape = &self.config.arpeggio;
                let notes = active_notes(&self.activations.output, shape.threshold);
                if notes.is_empty() {
                    return 0;
                }
                let repetitions = shape.repetitions(&mut self.rng);
                let steps = build_arpeggio(&notes, repetitions, shape.step, shape.jitter, &mut self.rng);
                for step in &steps {
                    let gain = shape.gain.sample(&mut self.rng);
                    self.scheduler.schedule_note(
                        now,
                        digit_to_frequency(step.note.index, shape.octave),
                        step.note.amplitude * gain * master,
                        step.delay,
                        VoiceKind::Harp,
                    );
                }
                steps.len()
            }
        }
    }

    fn play_due(&mut self, now: f64) -> usize {
        let mut played = 0;
        while let Some(trigger) = self.scheduler.pop_due(now) {
            // A context that went away mid-flight drops the note silently
            if let Some(ctx) = self.context.as_mut() {
                ctx.play(trigger.kind, trigger.frequency, trigger.amplitude);
                played += 1;
            }
        }
        played
    }
}

impl<F: ContextFactory, R: Rng> Drop for SonificationEngine<F, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn slot(kind: RoutineKind) -> usize {
    match kind {
        RoutineKind::Pad => 0,
        RoutineKind::Lead => 1,
        RoutineKind::Arpeggio => 2,
    }
}
