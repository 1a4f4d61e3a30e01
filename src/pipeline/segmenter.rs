//! Splits the normalized audio track into fixed-duration chunks.

use crate::audio::wav::{describe_spec, frames_to_duration};
use crate::defaults;
use crate::error::{RedubError, Result};
use crate::pipeline::types::{AudioChunk, chunk_file_name};
use hound::{SampleFormat, WavReader, WavWriter};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed-duration segmenter.
#[derive(Debug, Clone)]
pub struct Segmenter {
    chunk: Duration,
    silence_peak: i32,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(u64::from(defaults::CHUNK_SECS)))
    }
}

impl Segmenter {
    pub fn new(chunk: Duration) -> Self {
        Self {
            chunk,
            silence_peak: defaults::SILENCE_PEAK,
        }
    }

    /// Nominal chunk duration.
    pub fn chunk_duration(&self) -> Duration {
        self.chunk
    }

    /// Split `track` (mono integer PCM WAV) into chunk files under `out_dir`.
    ///
    /// Returns chunks ordered by index. Fails with `NoSegmentsProduced` when the
    /// track has no samples or is digital silence; no chunk files are left behind.
    pub fn segment(&self, track: &Path, out_dir: &Path) -> Result<Vec<AudioChunk>> {
        let mut reader = WavReader::open(track).map_err(|e| RedubError::ExtractionFailed {
            message: format!("unreadable audio track {}: {e}", track.display()),
        })?;
        let spec = reader.spec();
        if spec.channels != 1 || spec.sample_format != SampleFormat::Int {
            return Err(RedubError::ExtractionFailed {
                message: format!("expected mono integer PCM, got {}", describe_spec(&spec)),
            });
        }

        let frames_per_chunk =
            ((self.chunk.as_secs_f64() * f64::from(spec.sample_rate)).round() as u64).max(1);

        fs::create_dir_all(out_dir)?;

        let mut chunks = Vec::new();
        let mut writer: Option<WavWriter<_>> = None;
        let mut written: u64 = 0;
        let mut peak: i32 = 0;

        for sample in reader.samples::<i32>() {
            let sample = match sample {
                Ok(s) => s,
                Err(hound::Error::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    warn!("audio track ends before its declared length");
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            if writer.is_none() {
                let path = out_dir.join(chunk_file_name(chunks.len()));
                writer = Some(WavWriter::create(&path, spec)?);
            }
            if let Some(w) = writer.as_mut() {
                w.write_sample(sample)?;
            }
            peak = peak.max(sample.saturating_abs());
            written += 1;

            if written == frames_per_chunk {
                if let Some(w) = writer.take() {
                    w.finalize()?;
                }
                chunks.push(self.finish_chunk(out_dir, chunks.len(), written, spec.sample_rate));
                written = 0;
            }
        }

        if let Some(w) = writer.take() {
            w.finalize()?;
            chunks.push(self.finish_chunk(out_dir, chunks.len(), written, spec.sample_rate));
        }

        if chunks.is_empty() {
            return Err(RedubError::NoSegmentsProduced);
        }
        if peak <= self.silence_peak {
            debug!(peak, chunks = chunks.len(), "audio track is silent");
            for chunk in &chunks {
                if let Err(e) = fs::remove_file(&chunk.path) {
                    warn!("failed to remove {}: {e}", chunk.path.display());
                }
            }
            return Err(RedubError::NoSegmentsProduced);
        }

        debug!(
            chunks = chunks.len(),
            chunk_secs = self.chunk.as_secs_f64(),
            "segmented audio track"
        );
        Ok(chunks)
    }

    fn finish_chunk(&self, out_dir: &Path, index: usize, frames: u64, rate: u32) -> AudioChunk {
        AudioChunk {
            index,
            duration: frames_to_duration(frames, rate),
            path: out_dir.join(chunk_file_name(index)),
        }
    }
}

/// Sum of chunk durations.
pub fn total_duration(chunks: &[AudioChunk]) -> Duration {
    chunks.iter().map(|c| c.duration).sum()
}
