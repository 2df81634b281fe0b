// Purpose - inbound payloads from the classifier and the transport layer

pub mod event;
pub mod rate;

pub use event::{ActivationVector, ChordTrigger, InboundEvent, Instrument};
pub use rate::TriggerGate;
