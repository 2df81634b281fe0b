use crate::{error::AudioError, voices::VoiceKind};

#[cfg(feature = "rtrb")]
use {
    crate::{
        synth::{
            bank::VoiceBank,
            message::{StopSignal, SynthMessage},
            voice::VoiceInstance,
        },
        voices,
    },
    rand::rngs::StdRng,
    rtrb::{Consumer, Producer, RingBuffer},
    tracing::{debug, trace},
};

/// Lifecycle of an audio output context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Never created
    Uninitialized,
    /// Created but not producing sound yet
    Suspended,
    Running,
    /// Closed for good; voices can no longer be played
    Closed,
    /// Creation or resume failed; `init_audio` may be retried
    Failed,
}

impl ContextState {
    pub fn is_ready(self) -> bool {
        self == ContextState::Running
    }

    pub fn name(self) -> &'static str {
        match self {
            ContextState::Uninitialized => "uninitialized",
            ContextState::Suspended => "suspended",
            ContextState::Running => "running",
            ContextState::Closed => "closed",
            ContextState::Failed => "failed",
        }
    }
}

/// The session's audio output: builds and starts voices on demand.
///
/// `play` must never fail loudly. Calls on a context that is not running,
/// or with an inaudible amplitude, are dropped.
pub trait AudioContext {
    fn state(&self) -> ContextState;

    fn resume(&mut self) -> Result<(), AudioError>;

    fn play(&mut self, kind: VoiceKind, frequency: f32, amplitude: f32);

    /// Force-stop every live voice.
    fn stop_all(&mut self);

    /// Stop everything and release the output. Idempotent.
    fn close(&mut self);
}

/// Creates output contexts on demand.
///
/// Blanket-implemented for closures, so an engine can be handed a plain
/// `|| Ok(MyContext::new())`.
pub trait ContextFactory {
    type Context: AudioContext;

    fn create(&mut self) -> Result<Self::Context, AudioError>;
}

impl<F, C> ContextFactory for F
where
    F: FnMut() -> Result<C, AudioError>,
    C: AudioContext,
{
    type Context = C;

    fn create(&mut self) -> Result<Self::Context, AudioError> {
        self()
    }
}

/// Render-side bank paired with a [`RingContext`].
#[cfg(feature = "rtrb")]
pub type RingBank = VoiceBank<Consumer<SynthMessage>, Producer<VoiceInstance>>;

/// Control-side context feeding a [`VoiceBank`] through a lock-free ring.
///
/// Voice graphs are built here, on the control thread, and moved whole into
/// the ring. A full ring drops the note. Stopping bypasses the ring through
/// the bank's [`StopSignal`], and finished voices come back over a second
/// ring to be dropped here rather than on the audio thread.
#[cfg(feature = "rtrb")]
pub struct RingContext {
    tx: Producer<SynthMessage>,
    returned: Consumer<VoiceInstance>,
    stop: StopSignal,
    sample_rate: f32,
    rng: StdRng,
    state: ContextState,
}

#[cfg(feature = "rtrb")]
impl RingContext {
    /// Build a context and the bank it feeds. The bank goes to the audio thread.
    pub fn pair(
        max_voices: usize,
        queue_capacity: usize,
        sample_rate: f32,
        rng: StdRng,
    ) -> (Self, RingBank) {
        let (tx, rx) = RingBuffer::new(queue_capacity.max(1));
        // Every voice the bank can hold or be sent, twice over
        let (graveyard, returned) = RingBuffer::new(2 * (max_voices.max(1) + queue_capacity.max(1)));
        let bank = VoiceBank::with_sink(max_voices, rx, graveyard);

        let ctx = Self {
            tx,
            returned,
            stop: bank.stop_signal(),
            sample_rate,
            rng,
            state: ContextState::Suspended,
        };
        (ctx, bank)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Drop voices the bank has handed back. Returns how many.
    pub fn reclaim(&mut self) -> usize {
        let mut reclaimed = 0;
        while self.returned.pop().is_ok() {
            reclaimed += 1;
        }
        if reclaimed > 0 {
            trace!(reclaimed, "dropped finished voices");
        }
        reclaimed
    }
}

#[cfg(feature = "rtrb")]
impl AudioContext for RingContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        match self.state {
            ContextState::Closed => Err(AudioError::Closed),
            _ => {
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    fn play(&mut self, kind: VoiceKind, frequency: f32, amplitude: f32) {
        self.reclaim();
        if !self.state.is_ready() || !voices::is_audible(amplitude) {
            return;
        }

        let patch = voices::build(kind, &mut self.rng);
        let voice = VoiceInstance::new(kind, patch, frequency, amplitude, self.sample_rate)
            .with_epoch(self.stop.epoch());
        if self.tx.push(SynthMessage::Start(voice)).is_err() {
            debug!(voice = kind.name(), frequency, "voice queue full, note dropped");
        }
    }

    fn stop_all(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        self.stop.raise();
        self.reclaim();
    }

    fn close(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        self.stop_all();
        self.state = ContextState::Closed;
    }
}
