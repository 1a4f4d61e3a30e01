//! OpenAI-compatible HTTP client for transcription, translation and speech.

use crate::audio::wav::pcm16_mono;
use crate::config::ApiConfig;
use crate::error::{RedubError, Result, Service};
use crate::services::{
    Credential, SpeechSynthesizer, SpeechToText, Translator, translation_instruction,
};
use async_trait::async_trait;
use hound::WavSpec;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Sample rate of the WAV data the speech endpoint returns.
pub const SPEECH_SAMPLE_RATE: u32 = 24000;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 500;

/// Client for the three service endpoints under one base URL.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    credential: Credential,
    transcription_model: String,
    translation_model: String,
    speech_model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

impl OpenAiClient {
    /// Build a client from API settings and an explicit credential.
    pub fn new(config: &ApiConfig, credential: Credential) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| RedubError::ConfigInvalidValue {
            key: "api".to_string(),
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential,
            transcription_model: config.transcription_model.clone(),
            translation_model: config.translation_model.clone(),
            speech_model: config.speech_model.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Extract a useful message from an error response body.
///
/// Prefers the `error.message` field of a JSON error, else the raw body.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string));
    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.chars().count() > MAX_ERROR_BODY {
        let truncated: String = message.chars().take(MAX_ERROR_BODY).collect();
        format!("{truncated}…")
    } else {
        message
    }
}

/// Split a response into success or (status, message).
async fn check(response: Response) -> std::result::Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err((status.as_u16(), error_message(&body)))
}

fn unreachable(service: Service, e: reqwest::Error) -> RedubError {
    RedubError::ServiceUnreachable {
        service,
        message: e.to_string(),
    }
}

#[async_trait]
impl SpeechToText for OpenAiClient {
    async fn transcribe(&self, wav: Vec<u8>, file_name: &str) -> Result<String> {
        let part = Part::bytes(wav)
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| unreachable(Service::Transcription, e))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone())
            .text("response_format", "text");

        let response = self
            .http
            .post(self.url("audio/transcriptions"))
            .bearer_auth(self.credential.expose())
            .multipart(form)
            .send()
            .await
            .map_err(|e| unreachable(Service::Transcription, e))?;

        let response = check(response)
            .await
            .map_err(|(status, message)| RedubError::TranscriptionFailed { status, message })?;

        let text = response
            .text()
            .await
            .map_err(|e| unreachable(Service::Transcription, e))?;
        debug!(file = file_name, chars = text.len(), "transcribed");
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Translator for OpenAiClient {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let instruction = translation_instruction(target_language);
        let request = ChatRequest {
            model: &self.translation_model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| unreachable(Service::Translation, e))?;

        let response = check(response)
            .await
            .map_err(|(status, message)| RedubError::TranslationFailed { status, message })?;

        let status = response.status().as_u16();
        let body: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| RedubError::TranslationFailed {
                    status,
                    message: format!("unreadable response: {e}"),
                })?;

        let translated = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        debug!(
            target_language,
            chars = translated.len(),
            "translated"
        );
        Ok(translated.trim().to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.speech_model,
            voice,
            input: text,
            response_format: "wav",
        };

        let response = self
            .http
            .post(self.url("audio/speech"))
            .bearer_auth(self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| unreachable(Service::SpeechSynthesis, e))?;

        let response = check(response)
            .await
            .map_err(|(status, message)| RedubError::SpeechSynthesisFailed { status, message })?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unreachable(Service::SpeechSynthesis, e))?;
        debug!(voice, bytes = bytes.len(), "synthesized");
        Ok(bytes.to_vec())
    }

    fn output_spec(&self) -> WavSpec {
        pcm16_mono(SPEECH_SAMPLE_RATE)
    }
}
