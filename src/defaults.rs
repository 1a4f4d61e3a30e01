//! Default configuration constants for redub.
//!
//! Shared by the configuration types, the CLI and the pipeline so that every
//! layer agrees on the same values.

/// Sample rate of the normalized audio track in Hz.
///
/// 16kHz mono is what speech recognition services expect and keeps the
/// per-chunk upload small (about 1.9 MB per minute of 16-bit PCM).
pub const SAMPLE_RATE: u32 = 16000;

/// Nominal chunk duration in seconds.
///
/// One chunk per minute is what the duration budget is expressed in.
pub const CHUNK_SECS: u32 = 60;

/// Default processing budget in minutes.
pub const MAX_MINUTES: u32 = 45;

/// Lower bound of the processing budget in minutes.
pub const MIN_MAX_MINUTES: u32 = 1;

/// Upper bound of the processing budget in minutes.
pub const MAX_MAX_MINUTES: u32 = 300;

/// Default target language code.
pub const DEFAULT_LANGUAGE: &str = "es";

/// Default number of chunks dubbed concurrently (1 = strictly sequential).
pub const PARALLEL_CHUNKS: usize = 1;

/// Samples whose magnitude never exceeds this are treated as digital silence.
pub const SILENCE_PEAK: i32 = 8;

/// Default OpenAI-compatible API base URL.
pub const API_BASE_URL: &str = "https://api.openai.com/v1";

/// Default transcription model.
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Default translation (chat completion) model.
pub const TRANSLATION_MODEL: &str = "gpt-4o-mini";

/// Default speech synthesis model.
pub const SPEECH_MODEL: &str = "tts-1";

/// Default ffmpeg executable.
pub const FFMPEG: &str = "ffmpeg";

/// File stem of the final artifact (`dubbed.mp4`, `dubbed.webm`).
pub const ARTIFACT_STEM: &str = "dubbed";
