// Render side: played notes, the live-voice bank, and the output context
// the engine plays through.

pub mod bank;
pub mod context;
pub mod message;
pub mod voice;

pub use bank::VoiceBank;
pub use context::{AudioContext, ContextFactory, ContextState};
#[cfg(feature = "rtrb")]
pub use context::{RingBank, RingContext};
pub use message::{MessageReceiver, StopSignal, SynthMessage, VoiceSink};
pub use voice::VoiceInstance;
