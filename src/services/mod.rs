//! Speech and translation service boundary.
//!
//! The pipeline talks to three services through the traits below. The HTTP
//! implementation lives in [`openai`]; [`mock`] provides scripted stand-ins.

pub mod mock;
pub mod openai;

use crate::error::{RedubError, Result};
use async_trait::async_trait;
use hound::WavSpec;
use std::fmt;

pub use mock::{MockSpeechToText, MockSynthesizer, MockTranslator};
pub use openai::OpenAiClient;

/// Bearer credential for the service endpoints.
///
/// Passed explicitly to the client that uses it; never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap an API key. Blank keys are rejected.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(RedubError::MissingCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build from an optional configured key.
    pub fn from_option(key: Option<&str>) -> Result<Self> {
        key.map_or(Err(RedubError::MissingCredential), Self::new)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Speech-to-text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe a WAV file's bytes. `file_name` is what the upload is called.
    async fn transcribe(&self, wav: Vec<u8>, file_name: &str) -> Result<String>;
}

/// Text translation.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (ISO-639-1 code), returning
    /// only the translation. A response without content yields `""`.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Text-to-speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`, returning WAV bytes.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;

    /// Format of the WAV data `synthesize` returns.
    fn output_spec(&self) -> WavSpec;
}

/// Instruction sent as the system message of every translation request.
pub fn translation_instruction(target_language: &str) -> String {
    let name = crate::catalog::get_language(target_language)
        .map(|l| l.name)
        .unwrap_or(target_language);
    format!(
        "You are a professional translator. Translate the user's text into {name} \
         (language code \"{target_language}\"). Preserve the meaning and tone. \
         Reply with the translated text only: do not repeat the original, \
         do not add notes, explanations or any other commentary."
    )
}
