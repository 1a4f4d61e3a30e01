//! WAV helpers shared by the segmenter, dubbing stage and assembler.

use crate::error::{RedubError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::borrow::Cow;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;

/// Decoded integer PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub spec: WavSpec,
    /// Interleaved samples, widened to i32 regardless of bit depth.
    pub samples: Vec<i32>,
}

impl PcmAudio {
    /// Playback duration.
    pub fn duration(&self) -> Duration {
        let channels = u32::from(self.spec.channels.max(1));
        frames_to_duration(self.samples.len() as u64 / u64::from(channels), self.spec.sample_rate)
    }

    /// Encode to an in-memory WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, self.spec)?;
            for &s in &self.samples {
                writer.write_sample(s)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    /// Write to a WAV file on disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = WavWriter::create(path, self.spec)?;
        for &s in &self.samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

/// 16-bit signed mono PCM at the given rate.
pub fn pcm16_mono(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Human-readable format summary, e.g. "24000 Hz, 1 ch, 16-bit int".
pub fn describe_spec(spec: &WavSpec) -> String {
    let kind = match spec.sample_format {
        SampleFormat::Int => "int",
        SampleFormat::Float => "float",
    };
    format!(
        "{} Hz, {} ch, {}-bit {}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, kind
    )
}

/// Convert a frame count to a duration.
pub fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(frames as f64 / f64::from(sample_rate))
}

/// Silence of the given length in the given format.
pub fn silence(spec: WavSpec, duration: Duration) -> PcmAudio {
    let frames = (duration.as_secs_f64() * f64::from(spec.sample_rate)).round() as usize;
    PcmAudio {
        spec,
        samples: vec![0; frames * usize::from(spec.channels)],
    }
}

/// Decode integer PCM WAV data from any reader.
///
/// A read that ends early with `UnexpectedEof` keeps the samples decoded so
/// far. Header sizes are taken as given; see [`decode_bytes`] for buffers
/// from streaming encoders.
pub fn decode<R: Read>(reader: R) -> Result<PcmAudio> {
    let mut wav_reader = WavReader::new(reader)?;
    let spec = wav_reader.spec();

    if spec.sample_format != SampleFormat::Int {
        return Err(RedubError::IncompatibleChunkFormat {
            expected: "integer PCM".to_string(),
            actual: describe_spec(&spec),
        });
    }

    let mut samples = Vec::with_capacity(wav_reader.len().min(1 << 24) as usize);
    for sample in wav_reader.samples::<i32>() {
        match sample {
            Ok(s) => samples.push(s),
            Err(hound::Error::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(PcmAudio { spec, samples })
}

/// Decode an in-memory WAV file.
///
/// Headers written by streaming encoders (`0xFFFFFFFF` or otherwise
/// overlong RIFF and `data` sizes) are fixed up to the bytes actually present.
pub fn decode_bytes(bytes: &[u8]) -> Result<PcmAudio> {
    decode(Cursor::new(repair_streaming_header(bytes)))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let field = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([field[0], field[1], field[2], field[3]]))
}

/// Clamp the RIFF and `data` chunk sizes to the buffer length.
///
/// The `data` size is rounded down to whole frames. Anything that is not a
/// RIFF/WAVE buffer is returned untouched for the decoder to reject.
fn repair_streaming_header(bytes: &[u8]) -> Cow<'_, [u8]> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Cow::Borrowed(bytes);
    }
    let len = bytes.len();
    let mut patched: Option<Vec<u8>> = None;

    let riff_actual = (len - 8) as u32;
    if read_u32(bytes, 4).is_some_and(|size| size > riff_actual) {
        patched.get_or_insert_with(|| bytes.to_vec())[4..8]
            .copy_from_slice(&riff_actual.to_le_bytes());
    }

    let mut block_align: usize = 1;
    let mut offset = 12;
    while let Some(size) = read_u32(bytes, offset + 4) {
        let id = &bytes[offset..offset + 4];
        let body = offset + 8;
        let remaining = len - body;
        if id == b"fmt " && remaining >= 14 {
            let align = u16::from_le_bytes([bytes[body + 12], bytes[body + 13]]);
            block_align = usize::from(align.max(1));
        }
        if id == b"data" {
            if size as usize > remaining {
                let actual = (remaining - remaining % block_align) as u32;
                patched.get_or_insert_with(|| bytes.to_vec())[offset + 4..offset + 8]
                    .copy_from_slice(&actual.to_le_bytes());
            }
            break;
        }
        // chunks are padded to an even length
        let next = body
            .saturating_add(size as usize)
            .saturating_add((size & 1) as usize);
        if next >= len {
            break;
        }
        offset = next;
    }

    match patched {
        Some(fixed) => Cow::Owned(fixed),
        None => Cow::Borrowed(bytes),
    }
}

/// Read the header of a WAV file on disk and return its format and duration.
pub fn probe(path: &Path) -> Result<(WavSpec, Duration)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    Ok((spec, frames_to_duration(u64::from(reader.duration()), spec.sample_rate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn decode_16khz_mono_matches_exactly() {
        let input = vec![100i16, -200, 300, 400, 500];
        let audio = decode_bytes(&make_wav_data(16000, 1, &input)).unwrap();

        assert_eq!(audio.spec, pcm16_mono(16000));
        assert_eq!(audio.samples, vec![100, -200, 300, 400, 500]);
    }

    #[test]
    fn duration_accounts_for_channels() {
        let stereo = decode_bytes(&make_wav_data(8000, 2, &vec![0i16; 16000])).unwrap();
        assert_eq!(stereo.duration(), Duration::from_secs(1));
    }

    #[test]
    fn decode_tolerates_placeholder_data_length() {
        let mut wav = make_wav_data(24000, 1, &[1i16, 2, 3, 4]);
        let pos = wav.windows(4).position(|w| w == b"data").unwrap();
        wav[pos + 4..pos + 8].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());

        let audio = decode_bytes(&wav).unwrap();
        assert_eq!(audio.samples, vec![1, 2, 3, 4]);
    }

    #[test]
    fn decode_accepts_streaming_header_with_unknown_sizes() {
        let mut wav = make_wav_data(24000, 1, &[1i16, 2, 3, 4]);
        wav[4..8].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        let pos = wav.windows(4).position(|w| w == b"data").unwrap();
        wav[pos + 4..pos + 8].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

        let audio = decode_bytes(&wav).unwrap();
        assert_eq!(audio.spec, pcm16_mono(24000));
        assert_eq!(audio.samples, vec![1, 2, 3, 4]);
    }

    #[test]
    fn streaming_header_drops_trailing_partial_frame() {
        let mut wav = make_wav_data(24000, 1, &[7i16, 8, 9]);
        wav.push(0x55);
        let pos = wav.windows(4).position(|w| w == b"data").unwrap();
        wav[pos + 4..pos + 8].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

        let audio = decode_bytes(&wav).unwrap();
        assert_eq!(audio.samples, vec![7, 8, 9]);
    }

    #[test]
    fn well_formed_header_is_not_copied() {
        let wav = make_wav_data(16000, 1, &[1i16, 2]);
        assert!(matches!(repair_streaming_header(&wav), Cow::Borrowed(_)));
        assert!(matches!(
            repair_streaming_header(b"not a wav file"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn decode_rejects_float_wav() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        writer.write_sample(0.5f32).unwrap();
        writer.finalize().unwrap();

        let result = decode_bytes(&cursor.into_inner());
        assert!(matches!(
            result,
            Err(RedubError::IncompatibleChunkFormat { .. })
        ));
    }

    #[test]
    fn invalid_wav_data_returns_error() {
        assert!(matches!(
            decode_bytes(&[0u8, 1, 2, 3, 4, 5]),
            Err(RedubError::Wav(_))
        ));
        assert!(decode_bytes(&[]).is_err());
        assert!(decode_bytes(b"XXXX\x00\x00\x00\x00WAVEfmt ").is_err());
    }

    #[test]
    fn silence_has_requested_length_and_format() {
        let spec = pcm16_mono(24000);
        let audio = silence(spec, Duration::from_millis(1500));

        assert_eq!(audio.spec, spec);
        assert_eq!(audio.samples.len(), 36000);
        assert!(audio.samples.iter().all(|&s| s == 0));
        assert_eq!(audio.duration(), Duration::from_millis(1500));
    }

    #[test]
    fn wav_bytes_decode_back() {
        let audio = PcmAudio {
            spec: pcm16_mono(22050),
            samples: vec![0, 32767, -32768, 12],
        };
        let decoded = decode_bytes(&audio.to_wav_bytes().unwrap()).unwrap();
        assert_eq!(decoded, audio);
    }

    #[test]
    fn write_to_and_probe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let audio = PcmAudio {
            spec: pcm16_mono(16000),
            samples: vec![7; 8000],
        };
        audio.write_to(&path).unwrap();

        let (spec, duration) = probe(&path).unwrap();
        assert_eq!(spec, audio.spec);
        assert_eq!(duration, Duration::from_millis(500));
    }

    #[test]
    fn describe_spec_is_readable() {
        assert_eq!(describe_spec(&pcm16_mono(24000)), "24000 Hz, 1 ch, 16-bit int");
    }

    #[test]
    fn frames_to_duration_zero_rate() {
        assert_eq!(frames_to_duration(100, 0), Duration::ZERO);
    }
}
