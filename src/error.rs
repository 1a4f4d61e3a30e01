//! Error types for redub.

use std::fmt;
use thiserror::Error;

/// External service a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Transcription,
    Translation,
    SpeechSynthesis,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Transcription => write!(f, "transcription"),
            Service::Translation => write!(f, "translation"),
            Service::SpeechSynthesis => write!(f, "speech synthesis"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RedubError {
    // Input errors
    #[error("No API key configured (set api.api_key, REDUB_API_KEY or OPENAI_API_KEY)")]
    MissingCredential,

    #[error("Input media not found: {path}")]
    NoInputMedia { path: String },

    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unsupported target language: {code}")]
    UnsupportedLanguage { code: String },

    #[error("Unknown voice preset: {name}")]
    UnknownVoice { name: String },

    // Media errors
    #[error("Audio extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("Segmentation produced no chunks (audio track is empty or silent)")]
    NoSegmentsProduced,

    #[error("Incompatible chunk format: expected {expected}, got {actual}")]
    IncompatibleChunkFormat { expected: String, actual: String },

    #[error("Chunk sequence gap: expected index {expected}, found {found}")]
    ChunkSequenceGap { expected: usize, found: usize },

    #[error("Muxing failed: {message}")]
    MuxingFailed { message: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Service errors
    #[error("Transcription failed (HTTP {status}): {message}")]
    TranscriptionFailed { status: u16, message: String },

    #[error("Translation failed (HTTP {status}): {message}")]
    TranslationFailed { status: u16, message: String },

    #[error("Speech synthesis failed (HTTP {status}): {message}")]
    SpeechSynthesisFailed { status: u16, message: String },

    #[error("Could not reach {service} service: {message}")]
    ServiceUnreachable { service: Service, message: String },

    // Orchestration errors
    #[error("A dubbing run is already in progress")]
    RunAlreadyInProgress,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RedubError {
    /// HTTP status carried by a service failure, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            RedubError::TranscriptionFailed { status, .. }
            | RedubError::TranslationFailed { status, .. }
            | RedubError::SpeechSynthesisFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RedubError>;
