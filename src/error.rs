use std::path::PathBuf;

/// Failures creating or resuming the audio output context.
///
/// These never escape the engine: `init_audio` records them in the context
/// state so the host can prompt for another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No output device is available
    NoDevice,
    /// The platform refused to start playback (e.g. autoplay policy)
    Blocked(String),
    /// The output stream could not be built or started
    Stream(String),
    /// The context was closed and cannot be resumed
    Closed,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoDevice => write!(f, "no audio output device available"),
            AudioError::Blocked(reason) => write!(f, "audio playback blocked: {}", reason),
            AudioError::Stream(reason) => write!(f, "audio stream error: {}", reason),
            AudioError::Closed => write!(f, "audio context already closed"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Errors loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// The config file is not valid TOML for this schema
    #[cfg(feature = "serde")]
    Parse { path: PathBuf, source: toml::de::Error },
    /// A field holds a value outside its allowed range
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            #[cfg(feature = "serde")]
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid config field `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            #[cfg(feature = "serde")]
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}
