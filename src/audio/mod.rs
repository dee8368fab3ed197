//! In-memory PCM audio — buffer model, rate conversion and WAV container.
//!
//! # Pipeline
//!
//! ```text
//! TTS bytes ──▶ WavCodec::decode ──▶ WaveformBuffer
//!           ──▶ with_sample_rate / resample / gain_db / slice_ms
//!           ──▶ WavCodec::encode ──▶ file bytes
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use voice_augment::audio::{AudioCodec, WaveformBuffer, WavCodec};
//!
//! let silence = WaveformBuffer::silent(1_000, 16_000, 1).unwrap();
//! let bytes = WavCodec.encode(&silence).unwrap();
//! let decoded = WavCodec.decode(&bytes).unwrap();
//! assert_eq!(decoded.duration_ms(), 1_000);
//! ```

pub mod buffer;
pub mod codec;
pub mod resample;

use thiserror::Error;

pub use buffer::WaveformBuffer;
pub use codec::{AudioCodec, WavCodec};
#[cfg(test)]
pub use codec::RawPcmCodec;
pub use resample::{resample_channels, CANONICAL_SAMPLE_RATE};

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Errors raised while building, transforming or (de)serialising audio.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// The buffer is empty or its layout is inconsistent with its header.
    #[error("invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// Sample-rate conversion failed inside the resampler.
    #[error("resampling failed: {0}")]
    Resample(String),

    /// The container bytes could not be encoded or decoded.
    #[error("audio container error: {0}")]
    Codec(String),
}
