use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, PushError};

use crate::synth::voice::VoiceInstance;

/// Control → render messages. Stopping goes through [`StopSignal`] instead.
pub enum SynthMessage {
    /// Start playing a fully built voice
    Start(VoiceInstance),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

/// Global stop that bypasses the message ring.
///
/// Raising bumps an epoch. The bank compares it at the top of every block,
/// sweeps all live voices when it moved, and discards queued voices stamped
/// with an older epoch. A full ring can therefore never swallow a teardown.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicU64>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    pub fn epoch(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

/// Where the render side puts voices it is done with.
///
/// Dropping a voice frees its graph, so the realtime bank hands finished
/// voices back instead and the control side drops them.
pub trait VoiceSink {
    fn retire(&mut self, voice: VoiceInstance);
}

/// Drops retired voices in place. For offline rendering and tests.
impl VoiceSink for () {
    fn retire(&mut self, _voice: VoiceInstance) {}
}

impl VoiceSink for Vec<VoiceInstance> {
    fn retire(&mut self, voice: VoiceInstance) {
        self.push(voice);
    }
}

#[cfg(feature = "rtrb")]
impl VoiceSink for Producer<VoiceInstance> {
    fn retire(&mut self, voice: VoiceInstance) {
        // Only a reclaim ring that was never drained is full; drop here then
        if let Err(PushError::Full(voice)) = self.push(voice) {
            drop(voice);
        }
    }
}
