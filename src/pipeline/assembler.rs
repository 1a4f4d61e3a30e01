//! Concatenates synthesized chunks into the dubbed track.

use crate::audio::wav::{decode, describe_spec, frames_to_duration};
use crate::error::{RedubError, Result};
use crate::pipeline::types::{DubbedTrack, SynthesizedChunk};
use hound::WavWriter;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Append `chunks` in index order into a single WAV at `dest`.
///
/// Indices must run contiguously from 0 and every chunk must share the first
/// chunk's format. Samples are copied as-is with nothing inserted between
/// chunks.
pub fn assemble(mut chunks: Vec<SynthesizedChunk>, dest: &Path) -> Result<DubbedTrack> {
    chunks.sort_by_key(|c| c.index);

    let Some(first) = chunks.first() else {
        return Err(RedubError::NoSegmentsProduced);
    };
    let spec = first.spec;

    for (expected, chunk) in chunks.iter().enumerate() {
        if chunk.index != expected {
            return Err(RedubError::ChunkSequenceGap {
                expected,
                found: chunk.index,
            });
        }
        if chunk.spec != spec {
            return Err(RedubError::IncompatibleChunkFormat {
                expected: describe_spec(&spec),
                actual: describe_spec(&chunk.spec),
            });
        }
    }

    let mut writer = WavWriter::create(dest, spec)?;
    let mut samples: u64 = 0;
    for chunk in &chunks {
        let audio = decode(BufReader::new(File::open(&chunk.path)?))?;
        if audio.spec != spec {
            return Err(RedubError::IncompatibleChunkFormat {
                expected: describe_spec(&spec),
                actual: describe_spec(&audio.spec),
            });
        }
        for &s in &audio.samples {
            writer.write_sample(s)?;
        }
        samples += audio.samples.len() as u64;
    }
    writer.finalize()?;

    let frames = samples / u64::from(spec.channels.max(1));
    let track = DubbedTrack {
        path: dest.to_path_buf(),
        spec,
        duration: frames_to_duration(frames, spec.sample_rate),
        chunks: chunks.len(),
    };
    debug!(
        chunks = track.chunks,
        secs = track.duration.as_secs_f64(),
        "assembled dubbed track"
    );
    Ok(track)
}
