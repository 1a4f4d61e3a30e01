//! redub - Dub videos into another language
//!
//! Segmented dubbing pipeline: extract the audio track, cut it into
//! fixed-length chunks, transcribe, translate and re-voice each chunk, then
//! remux the dubbed track onto the original video.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod app;
pub mod audio;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod media;
#[cfg(feature = "cli")]
pub mod output;
pub mod pipeline;
pub mod services;

// Service boundary (transcribe → translate → synthesize)
pub use services::{Credential, OpenAiClient, SpeechSynthesizer, SpeechToText, Translator};

// Media boundary
pub use media::{Container, FfmpegTranscoder, FinalArtifact, SourceMedia, Transcoder};

// Pipeline
pub use pipeline::{DubRequest, Dubber, DubbingStage, RunSnapshot, RunStatus, Workspace};

// Error handling
pub use error::{RedubError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
