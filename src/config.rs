//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the values it wants
//! to change:
//!
//! ```toml
//! enabled = true
//! master_volume = 0.6
//! scale = [0, 2, 4, 5, 7, 9, 11]
//!
//! [lead]
//! interval = { min = 0.2, max = 0.8 }
//!
//! [render]
//! max_voices = 64
//! ```
//!
//! Timing constants, gains and rates are a tunable preset; nothing in the
//! engine depends on their exact values beyond the ranges `validate` checks.

use rand::Rng;

#[cfg(feature = "serde")]
use std::path::Path;

use crate::{error::ConfigError, pitch::NATURAL_MINOR};

/// Closed range `[min, max]` sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(ConfigError::invalid(field, "bounds must be finite"));
        }
        if self.min < 0.0 {
            return Err(ConfigError::invalid(field, format!("min {} is negative", self.min)));
        }
        if self.min > self.max {
            return Err(ConfigError::invalid(
                field,
                format!("min {} is greater than max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Ambient pad chords from the first hidden layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PadConfig {
    /// Seconds between firings
    pub interval: Span,
    /// Activations must be strictly above this to sound
    pub threshold: f32,
    /// Amplitude multiplier applied to the activation value
    pub gain: f32,
    /// Semitones added to the activation index before quantizing
    pub note_offset: i32,
    /// Notes played per firing, strongest first
    pub max_notes: usize,
}

impl PadConfig {
    fn check(&self) -> Result<(), ConfigError> {
        self.interval.check("pad.interval")?;
        check_unit("pad", "threshold", self.threshold)?;
        check_gain("pad", self.gain)?;
        if self.max_notes == 0 {
            return Err(ConfigError::invalid("pad.max_notes", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            interval: Span::new(4.0, 5.0),
            threshold: 0.3,
            gain: 0.12,
            note_offset: 0,
            max_notes: 3,
        }
    }
}

/// Single bell notes picked at random from the second hidden layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LeadConfig {
    pub interval: Span,
    pub threshold: f32,
    pub gain: f32,
    pub note_offset: i32,
}

impl LeadConfig {
    fn check(&self) -> Result<(), ConfigError> {
        self.interval.check("lead.interval")?;
        check_unit("lead", "threshold", self.threshold)?;
        check_gain("lead", self.gain)
    }
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            interval: Span::new(0.1, 1.1),
            threshold: 0.25,
            gain: 0.2,
            note_offset: 60,
        }
    }
}

/// Shape of the arpeggios built from the output layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArpeggioConfig {
    /// Base seconds between firings, before confidence scaling
    pub interval: Span,
    pub threshold: f32,
    /// Per-note gain, drawn once per note
    pub gain: Span,
    pub min_repetitions: u32,
    pub max_repetitions: u32,
    /// Base seconds between consecutive notes
    pub step: f32,
    /// Per-step multiplier on `step`
    pub jitter: Span,
    /// Octave offset into the digit table
    pub octave: i32,
}

impl ArpeggioConfig {
    /// Draw a repetition count, at least 1 even for an unvalidated range.
    pub fn repetitions<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let min = self.min_repetitions.max(1);
        let max = self.max_repetitions.max(min);
        rng.gen_range(min..=max)
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.interval.check("arpeggio.interval")?;
        self.gain.check("arpeggio.gain")?;
        self.jitter.check("arpeggio.jitter")?;
        check_unit("arpeggio", "threshold", self.threshold)?;
        if self.min_repetitions == 0 || self.min_repetitions > self.max_repetitions {
            return Err(ConfigError::invalid(
                "arpeggio",
                format!(
                    "repetitions {}..={} must be a non-empty range starting at 1 or more",
                    self.min_repetitions, self.max_repetitions
                ),
            ));
        }
        if !(self.step.is_finite() && self.step >= 0.0) {
            return Err(ConfigError::invalid("arpeggio.step", "must be a non-negative number"));
        }
        Ok(())
    }
}

impl Default for ArpeggioConfig {
    fn default() -> Self {
        Self {
            interval: Span::new(1.0, 2.0),
            threshold: 0.1,
            gain: Span::new(0.08, 0.12),
            min_repetitions: 2,
            max_repetitions: 4,
            step: 0.12,
            jitter: Span::new(0.7, 1.4),
            octave: 0,
        }
    }
}

/// Chord triggers from participants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChordConfig {
    pub threshold: f32,
    pub gain: f32,
    /// Minimum seconds between two accepted triggers of one participant
    pub rate_limit: f32,
    /// Seconds of silence after which a participant is forgotten; 0 never
    pub idle_timeout: f32,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            gain: 0.25,
            rate_limit: 0.08,
            idle_timeout: 120.0,
        }
    }
}

/// Visual bloom envelope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BloomConfig {
    pub attack: f32,
    pub total: f32,
    pub lfo_hz: f32,
    pub depth: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            attack: 0.06,
            total: 1.6,
            lfo_hz: 0.8,
            depth: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    pub sample_rate: f32,
    pub max_voices: usize,
    /// Capacity of the control → audio message ring
    pub queue_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_voices: 48,
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub enabled: bool,
    pub master_volume: f32,
    /// Scale degrees in [0, 12) used for the pad and lead routines
    pub scale: Vec<u8>,
    pub pad: PadConfig,
    pub lead: LeadConfig,
    pub arpeggio: ArpeggioConfig,
    pub chord: ChordConfig,
    pub bloom: BloomConfig,
    pub render: RenderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            master_volume: 0.7,
            scale: NATURAL_MINOR.to_vec(),
            pad: PadConfig::default(),
            lead: LeadConfig::default(),
            arpeggio: ArpeggioConfig::default(),
            chord: ChordConfig::default(),
            bloom: BloomConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read a TOML file and validate it.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::invalid(
                "master_volume",
                format!("{} is outside [0, 1]", self.master_volume),
            ));
        }
        if self.scale.is_empty() {
            return Err(ConfigError::invalid("scale", "needs at least one degree"));
        }
        if let Some(degree) = self.scale.iter().find(|&&d| d >= 12) {
            return Err(ConfigError::invalid(
                "scale",
                format!("degree {} is out of range [0, 12)", degree),
            ));
        }

        self.pad.check()?;
        self.lead.check()?;
        self.arpeggio.check()?;

        check_unit("chord", "threshold", self.chord.threshold)?;
        check_gain("chord", self.chord.gain)?;
        if !(self.chord.rate_limit >= 0.0) {
            return Err(ConfigError::invalid("chord.rate_limit", "must be non-negative"));
        }
        if !(self.chord.idle_timeout >= 0.0) {
            return Err(ConfigError::invalid("chord.idle_timeout", "must be non-negative"));
        }

        let bloom = &self.bloom;
        if !(bloom.attack > 0.0 && bloom.attack < bloom.total) {
            return Err(ConfigError::invalid(
                "bloom",
                format!("attack {} must be positive and shorter than total {}", bloom.attack, bloom.total),
            ));
        }
        check_unit("bloom", "depth", bloom.depth)?;
        if !(bloom.lfo_hz >= 0.0) {
            return Err(ConfigError::invalid("bloom.lfo_hz", "must be non-negative"));
        }

        let render = &self.render;
        if !(render.sample_rate > 0.0) {
            return Err(ConfigError::invalid("render.sample_rate", "must be positive"));
        }
        if render.max_voices == 0 || render.queue_capacity == 0 {
            return Err(ConfigError::invalid(
                "render",
                "max_voices and queue_capacity must be at least 1",
            ));
        }

        Ok(())
    }
}

fn check_unit(field: &'static str, what: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} {} is outside [0, 1]", what, value)))
    }
}

fn check_gain(field: &'static str, gain: f32) -> Result<(), ConfigError> {
    if gain.is_finite() && gain >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("gain {} must be non-negative", gain)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().expect("default config should validate");

        assert_eq!(config.scale, vec![0, 2, 3, 5, 7, 8, 10]);
        assert_eq!(config.render.sample_rate, 48_000.0);
        assert_eq!(config.render.max_voices, 48);
        assert_eq!(config.render.queue_capacity, 256);
        assert!(config.pad.gain < config.lead.gain);
    }

    #[test]
    fn rejects_bad_scales() {
        let mut config = EngineConfig::default();
        config.scale = vec![0, 12];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "scale", .. })
        ));

        config.scale.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_spans_and_volume() {
        let mut config = EngineConfig::default();
        config.lead.interval = Span::new(2.0, 1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "lead.interval", .. })
        ));

        let mut config = EngineConfig::default();
        config.master_volume = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.pad.threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn span_samples_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let span = Span::new(0.7, 1.4);
        for _ in 0..1_000 {
            let v = span.sample(&mut rng);
            assert!((0.7..=1.4).contains(&v));
        }
        assert_eq!(Span::new(2.0, 2.0).sample(&mut rng), 2.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            master_volume = 0.5

            [lead]
            interval = { min = 0.2, max = 0.8 }
            "#,
        )
        .expect("parse");

        assert_eq!(config.master_volume, 0.5);
        assert_eq!(config.lead.interval, Span::new(0.2, 0.8));
        assert_eq!(config.lead.threshold, 0.25);
        assert_eq!(config.lead.note_offset, 60);
        assert_eq!(config.arpeggio, ArpeggioConfig::default());
    }
}
