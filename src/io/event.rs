//! Inbound payloads.
//!
//! With the `serde` feature these double as the JSON-lines wire format, one
//! object per line tagged by `"type"`:
//!
//! ```text
//! {"type":"activation","hidden1":[...],"hidden2":[...],"output":[...]}
//! {"type":"chord","participant":"p7","output":[...],"instrument":"bell","octave":0}
//! {"type":"enable","on":true}
//! {"type":"volume","value":0.6}
//! {"type":"leave","participant":"p7"}
//! ```

use crate::voices::VoiceKind;

/// Latest classifier output, one slice per layer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActivationVector {
    pub hidden1: Vec<f32>,
    pub hidden2: Vec<f32>,
    pub output: Vec<f32>,
}

impl ActivationVector {
    pub fn is_empty(&self) -> bool {
        self.hidden1.is_empty() && self.hidden2.is_empty() && self.output.is_empty()
    }
}

/// Voice family a participant has picked for their chords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum Instrument {
    #[default]
    Pad,
    Bell,
    Harp,
    Synth,
}

impl Instrument {
    /// Lenient parse: trimmed, case-insensitive, empty means pad, `lead` is
    /// the bell, anything unknown falls back to the bell.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "pad" => Instrument::Pad,
            "harp" => Instrument::Harp,
            "synth" => Instrument::Synth,
            _ => Instrument::Bell,
        }
    }

    pub fn name(self) -> &'static str {
        self.voice().name()
    }

    pub fn voice(self) -> VoiceKind {
        match self {
            Instrument::Pad => VoiceKind::Pad,
            Instrument::Bell => VoiceKind::Bell,
            Instrument::Harp => VoiceKind::Harp,
            Instrument::Synth => VoiceKind::Synth,
        }
    }

    /// Sustained families play chords as one simultaneous stack; struck
    /// families arpeggiate.
    pub fn plays_simultaneously(self) -> bool {
        matches!(self, Instrument::Pad | Instrument::Synth)
    }
}

impl From<String> for Instrument {
    fn from(name: String) -> Self {
        Instrument::from_name(&name)
    }
}

impl From<Instrument> for String {
    fn from(instrument: Instrument) -> Self {
        instrument.name().to_string()
    }
}

/// "Play my chord" from a participant.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChordTrigger {
    pub participant: String,
    /// Output-layer activations at the moment of the trigger
    pub output: Vec<f32>,
    pub instrument: Instrument,
    /// Octave offset into the digit table
    pub octave: i32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum InboundEvent {
    Activation(ActivationVector),
    Chord(ChordTrigger),
    Enable { on: bool },
    Volume { value: f32 },
    /// Participant disconnected
    Leave { participant: String },
}

#[cfg(feature = "serde")]
impl InboundEvent {
    /// Parse one JSON line.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_names() {
        assert_eq!(Instrument::from_name("  Harp "), Instrument::Harp);
        assert_eq!(Instrument::from_name("SYNTH"), Instrument::Synth);
        assert_eq!(Instrument::from_name(""), Instrument::Pad);
        assert_eq!(Instrument::from_name("   "), Instrument::Pad);
        assert_eq!(Instrument::from_name("lead"), Instrument::Bell);
        assert_eq!(Instrument::from_name("theremin"), Instrument::Bell);
    }

    #[test]
    fn chord_policy() {
        assert!(Instrument::Pad.plays_simultaneously());
        assert!(Instrument::Synth.plays_simultaneously());
        assert!(!Instrument::Bell.plays_simultaneously());
        assert!(!Instrument::Harp.plays_simultaneously());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parses_json_lines() {
        let event = InboundEvent::from_json(
            r#"{"type":"chord","participant":"p1","output":[0.0,0.9],"instrument":"Lead","octave":-1}"#,
        )
        .expect("chord");
        assert_eq!(
            event,
            InboundEvent::Chord(ChordTrigger {
                participant: "p1".into(),
                output: vec![0.0, 0.9],
                instrument: Instrument::Bell,
                octave: -1,
            })
        );

        let event = InboundEvent::from_json(r#"{"type":"activation","output":[0.5]}"#)
            .expect("activation");
        match event {
            InboundEvent::Activation(v) => {
                assert!(v.hidden1.is_empty());
                assert_eq!(v.output, vec![0.5]);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(
            InboundEvent::from_json(r#"{"type":"volume","value":0.25}"#).expect("volume"),
            InboundEvent::Volume { value: 0.25 }
        );
        assert_eq!(
            InboundEvent::from_json(r#"{"type":"leave","participant":"p7"}"#).expect("leave"),
            InboundEvent::Leave {
                participant: "p7".into()
            }
        );
        assert!(InboundEvent::from_json(r#"{"type":"leave"}"#).is_err());
        assert!(InboundEvent::from_json(r#"{"type":"dance"}"#).is_err());
    }
}
