//! Scripted service stand-ins for tests and dry runs.

use crate::audio::wav::{PcmAudio, pcm16_mono};
use crate::error::{RedubError, Result};
use crate::services::{SpeechSynthesizer, SpeechToText, Translator};
use async_trait::async_trait;
use hound::WavSpec;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Failure injected on the n-th call (0-based).
#[derive(Debug, Clone, Copy)]
struct ScriptedFailure {
    call: usize,
    status: u16,
}

/// Mock transcriber: returns a fixed transcript, optionally failing on one call.
#[derive(Debug)]
pub struct MockSpeechToText {
    response: String,
    failure: Option<ScriptedFailure>,
    calls: AtomicUsize,
    files: Mutex<Vec<String>>,
}

impl MockSpeechToText {
    pub fn new() -> Self {
        Self {
            response: "mock transcription".to_string(),
            failure: None,
            calls: AtomicUsize::new(0),
            files: Mutex::new(Vec::new()),
        }
    }

    /// Configure the transcript returned for every chunk
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Fail the `call`-th request (0-based) with the given HTTP status
    pub fn failing_on(mut self, call: usize, status: u16) -> Self {
        self.failure = Some(ScriptedFailure { call, status });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Upload file names in call order.
    pub fn files(&self) -> Vec<String> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl Default for MockSpeechToText {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(&self, _wav: Vec<u8>, file_name: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut files) = self.files.lock() {
            files.push(file_name.to_string());
        }
        match self.failure {
            Some(f) if f.call == call => Err(RedubError::TranscriptionFailed {
                status: f.status,
                message: "mock transcription failure".to_string(),
            }),
            _ => Ok(self.response.clone()),
        }
    }
}

/// Mock translator: tags the input with the target language, or returns a fixed text.
#[derive(Debug)]
pub struct MockTranslator {
    response: Option<String>,
    failure: Option<ScriptedFailure>,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            response: None,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Return this text for every request (use "" to mimic a response without content)
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    /// Fail the `call`-th request (0-based) with the given HTTP status
    pub fn failing_on(mut self, call: usize, status: u16) -> Self {
        self.failure = Some(ScriptedFailure { call, status });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(f) = self.failure
            && f.call == call
        {
            return Err(RedubError::TranslationFailed {
                status: f.status,
                message: "mock translation failure".to_string(),
            });
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| format!("[{target_language}] {text}")))
    }
}

/// Mock synthesizer: returns a constant tone of fixed length per request.
#[derive(Debug)]
pub struct MockSynthesizer {
    spec: WavSpec,
    clip: Duration,
    level: i32,
    failure: Option<ScriptedFailure>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    /// 16-bit mono at `sample_rate`, returning `clip` of audio per request.
    pub fn new(sample_rate: u32, clip: Duration) -> Self {
        Self {
            spec: pcm16_mono(sample_rate),
            clip,
            level: 1000,
            failure: None,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Fail the `call`-th request (0-based) with the given HTTP status
    pub fn failing_on(mut self, call: usize, status: u16) -> Self {
        self.failure = Some(ScriptedFailure { call, status });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts received, in call order.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, _voice: &str) -> Result<Vec<u8>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut texts) = self.texts.lock() {
            texts.push(text.to_string());
        }
        if let Some(f) = self.failure
            && f.call == call
        {
            return Err(RedubError::SpeechSynthesisFailed {
                status: f.status,
                message: "mock synthesis failure".to_string(),
            });
        }
        let frames = (self.clip.as_secs_f64() * f64::from(self.spec.sample_rate)).round() as usize;
        PcmAudio {
            spec: self.spec,
            samples: vec![self.level; frames],
        }
        .to_wav_bytes()
    }

    fn output_spec(&self) -> WavSpec {
        self.spec
    }
}
