//! Per-chunk dubbing: transcribe, translate, synthesize.

use crate::audio::wav::{PcmAudio, decode_bytes, silence};
use crate::error::{RedubError, Result};
use crate::pipeline::types::{AudioChunk, SynthesizedChunk, dub_file_name};
use crate::services::{SpeechSynthesizer, SpeechToText, Translator};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs one chunk through the three services and writes the synthesized WAV.
#[derive(Clone)]
pub struct DubbingStage {
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    target_language: String,
    voice: String,
}

impl DubbingStage {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        target_language: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            stt,
            translator,
            synthesizer,
            target_language: target_language.into(),
            voice: voice.into(),
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Dub `chunk`, writing `dub_NNNNN.wav` into `out_dir`.
    ///
    /// Blank transcripts skip translation and blank translations skip
    /// synthesis; both produce silence as long as the source chunk.
    pub async fn dub(&self, chunk: &AudioChunk, out_dir: &Path) -> Result<SynthesizedChunk> {
        let wav = tokio::fs::read(&chunk.path).await?;
        let transcript = self.stt.transcribe(wav, &chunk.file_name()).await?;
        if transcript.trim().is_empty() {
            warn!(chunk = chunk.index, "empty transcript, inserting silence");
            return self.write_silence(chunk, out_dir);
        }

        let translation = self
            .translator
            .translate(&transcript, &self.target_language)
            .await?;
        if translation.trim().is_empty() {
            warn!(chunk = chunk.index, "empty translation, inserting silence");
            return self.write_silence(chunk, out_dir);
        }

        let speech = self.synthesizer.synthesize(&translation, &self.voice).await?;
        let audio = decode_bytes(&speech).map_err(|e| match e {
            RedubError::Wav(e) => RedubError::SpeechSynthesisFailed {
                status: 200,
                message: format!("response is not WAV audio: {e}"),
            },
            other => other,
        })?;

        debug!(
            chunk = chunk.index,
            source_secs = chunk.duration.as_secs_f64(),
            dubbed_secs = audio.duration().as_secs_f64(),
            "chunk dubbed"
        );
        write_chunk(chunk.index, &audio, out_dir, false)
    }

    fn write_silence(&self, chunk: &AudioChunk, out_dir: &Path) -> Result<SynthesizedChunk> {
        let audio = silence(self.synthesizer.output_spec(), chunk.duration);
        write_chunk(chunk.index, &audio, out_dir, true)
    }
}

fn write_chunk(
    index: usize,
    audio: &PcmAudio,
    out_dir: &Path,
    silent: bool,
) -> Result<SynthesizedChunk> {
    let path = out_dir.join(dub_file_name(index));
    audio.write_to(&path)?;
    Ok(SynthesizedChunk {
        index,
        spec: audio.spec,
        duration: audio.duration(),
        path,
        silent,
    })
}
