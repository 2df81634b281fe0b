pub mod config;
pub mod dsp;
pub mod engine; // Routine driver, note scheduler, bloom
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod io; // Inbound payloads from the classifier and transport
pub mod pitch;
pub mod synth; // Voice instances, live-voice bank, output context
pub mod voices;

pub use config::EngineConfig;
pub use engine::SonificationEngine;
pub use error::{AudioError, ConfigError};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
