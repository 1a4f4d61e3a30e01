//! Data types flowing between pipeline stages.

use hound::WavSpec;
use std::path::PathBuf;
use std::time::Duration;

/// One slice of the normalized audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Position in the track, 0-based and contiguous. Determines playback order.
    pub index: usize,
    /// Length of this chunk; only the last chunk may be shorter than nominal.
    pub duration: Duration,
    /// WAV file holding the chunk's samples.
    pub path: PathBuf,
}

impl AudioChunk {
    /// File name used when uploading the chunk.
    pub fn file_name(&self) -> String {
        chunk_file_name(self.index)
    }
}

/// Synthesized speech for one chunk, tagged with the source chunk's index.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedChunk {
    pub index: usize,
    pub spec: WavSpec,
    pub duration: Duration,
    pub path: PathBuf,
    /// True when the chunk is generated silence (nothing to say).
    pub silent: bool,
}

/// The concatenated dubbed audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct DubbedTrack {
    pub path: PathBuf,
    pub spec: WavSpec,
    pub duration: Duration,
    pub chunks: usize,
}

/// Fixed-width chunk file name, e.g. `chunk_00007.wav`.
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{index:05}.wav")
}

/// Fixed-width synthesized chunk file name, e.g. `dub_00007.wav`.
pub fn dub_file_name(index: usize) -> String {
    format!("dub_{index:05}.wav")
}
