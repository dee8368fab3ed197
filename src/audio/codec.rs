//! Audio container bridge between synthesis output and exported files.
//!
//! [`AudioCodec`] is the seam; [`WavCodec`] is the only container the crate
//! exports (uncompressed 16-bit PCM WAV via `hound`).  Decoding is more
//! lenient than encoding so any common PCM WAV a TTS engine emits can be
//! read back.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::{AudioError, WaveformBuffer};

// ---------------------------------------------------------------------------
// AudioCodec trait
// ---------------------------------------------------------------------------

/// Encode / decode a [`WaveformBuffer`] to and from container bytes.
pub trait AudioCodec: Send + Sync {
    /// Serialise `buffer` into container bytes.
    fn encode(&self, buffer: &WaveformBuffer) -> Result<Vec<u8>, AudioError>;

    /// Parse container bytes into a buffer.
    fn decode(&self, bytes: &[u8]) -> Result<WaveformBuffer, AudioError>;

    /// File extension (without the dot) used for exported files.
    fn extension(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// WavCodec
// ---------------------------------------------------------------------------

/// RIFF/WAV container.
///
/// * `encode` always writes 16-bit integer PCM.
/// * `decode` accepts 8/16/24/32-bit integer and 32-bit float PCM and
///   converts everything to 16-bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

fn codec_err(e: hound::Error) -> AudioError {
    AudioError::Codec(e.to_string())
}

impl AudioCodec for WavCodec {
    fn encode(&self, buffer: &WaveformBuffer) -> Result<Vec<u8>, AudioError> {
        let spec = WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(codec_err)?;
            for &s in buffer.samples() {
                writer.write_sample(s).map_err(codec_err)?;
            }
            writer.finalize().map_err(codec_err)?;
        }
        Ok(cursor.into_inner())
    }

    fn decode(&self, bytes: &[u8]) -> Result<WaveformBuffer, AudioError> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(codec_err)?;
        let spec = reader.spec();

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 8) => reader
                .into_samples::<i8>()
                .map(|s| s.map(|v| (v as i16) << 8))
                .collect::<Result<Vec<i16>, _>>(),
            (SampleFormat::Int, 16) => reader.into_samples::<i16>().collect::<Result<Vec<i16>, _>>(),
            (SampleFormat::Int, bits @ (24 | 32)) => {
                let shift = bits - 16;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| (v >> shift) as i16))
                    .collect::<Result<Vec<i16>, _>>()
            }
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v * 32_768.0).round().clamp(-32_768.0, 32_767.0) as i16))
                .collect::<Result<Vec<i16>, _>>(),
            (format, bits) => {
                return Err(AudioError::Codec(format!(
                    "unsupported WAV sample format: {format:?} {bits}-bit"
                )))
            }
        }
        .map_err(codec_err)?;

        WaveformBuffer::new(samples, spec.sample_rate, spec.channels)
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// ---------------------------------------------------------------------------
// RawPcmCodec  (test-only)
// ---------------------------------------------------------------------------

/// Headerless little-endian i16 samples, read back as 16 kHz mono.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPcmCodec;

#[cfg(test)]
impl AudioCodec for RawPcmCodec {
    fn encode(&self, buffer: &WaveformBuffer) -> Result<Vec<u8>, AudioError> {
        Ok(buffer.samples().iter().flat_map(|s| s.to_le_bytes()).collect())
    }

    fn decode(&self, bytes: &[u8]) -> Result<WaveformBuffer, AudioError> {
        if bytes.len() % 2 != 0 {
            return Err(AudioError::Codec(format!("odd byte count {}", bytes.len())));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        WaveformBuffer::new(samples, 16_000, 1)
    }

    fn extension(&self) -> &'static str {
        "raw"
    }
}
