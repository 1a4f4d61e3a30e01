//! Transcoding adapter: the boundary to the external media engine.

use crate::defaults::SAMPLE_RATE;
use crate::error::{RedubError, Result};
use crate::media::source::{Container, SourceMedia};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Media engine operations the pipeline needs.
///
/// Implementations must be deterministic for the same inputs.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Write the source's audio as mono 16 kHz 16-bit PCM WAV to `dest`.
    async fn extract_audio(&self, source: &SourceMedia, dest: &Path) -> Result<()>;

    /// Write `source`'s video stream with `dubbed` as its only audio stream to `dest`.
    ///
    /// The output ends with the shorter of the two streams.
    async fn remux(&self, source: &SourceMedia, dubbed: &Path, dest: &Path) -> Result<()>;

    /// Name for logging.
    fn name(&self) -> &str;
}

/// Transcoder backed by the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for audio extraction.
    pub fn extract_args(input: &Path, dest: &Path) -> Vec<OsString> {
        let rate = SAMPLE_RATE.to_string();
        let mut args = common_args();
        args.extend(["-i".into(), input.into()]);
        args.extend(
            [
                "-vn",
                "-ac",
                "1",
                "-ar",
                rate.as_str(),
                "-c:a",
                "pcm_s16le",
                "-f",
                "wav",
            ]
            .map(OsString::from),
        );
        args.push(dest.into());
        args
    }

    /// Arguments for remuxing video + dubbed audio.
    pub fn remux_args(
        video: &Path,
        dubbed: &Path,
        container: Container,
        dest: &Path,
    ) -> Vec<OsString> {
        let mut args = common_args();
        args.extend(["-i".into(), video.into(), "-i".into(), dubbed.into()]);
        args.extend(
            [
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-c:v",
                "copy",
                "-c:a",
                container.audio_codec(),
                "-b:a",
                "128k",
                "-shortest",
            ]
            .map(OsString::from),
        );
        if container == Container::Mp4 {
            args.extend(["-movflags", "+faststart"].map(OsString::from));
        }
        args.push(dest.into());
        args
    }

    async fn run(&self, args: Vec<OsString>) -> std::result::Result<(), String> {
        debug!(program = %self.program, ?args, "running media engine");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {e}", self.program))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        match output.status.code() {
            Some(code) if detail.is_empty() => Err(format!("{} exited with code {code}", self.program)),
            Some(code) => Err(format!("{} exited with code {code}: {detail}", self.program)),
            None => Err(format!("{} was terminated by a signal", self.program)),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(crate::defaults::FFMPEG)
    }
}

fn common_args() -> Vec<OsString> {
    ["-y", "-hide_banner", "-nostdin", "-loglevel", "error"]
        .map(OsString::from)
        .to_vec()
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract_audio(&self, source: &SourceMedia, dest: &Path) -> Result<()> {
        self.run(Self::extract_args(source.path(), dest))
            .await
            .map_err(|message| RedubError::ExtractionFailed { message })?;

        if !dest.is_file() {
            return Err(RedubError::ExtractionFailed {
                message: format!("{} produced no output", self.program),
            });
        }
        Ok(())
    }

    async fn remux(&self, source: &SourceMedia, dubbed: &Path, dest: &Path) -> Result<()> {
        self.run(Self::remux_args(source.path(), dubbed, source.container(), dest))
            .await
            .map_err(|message| RedubError::MuxingFailed { message })
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}
