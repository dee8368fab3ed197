//! Owned, interleaved 16-bit PCM waveform.
//!
//! [`WaveformBuffer`] is the unit of work for the whole crate: synthesis
//! produces one, every augmentation step consumes one and returns a new one,
//! and the codec turns the last one into container bytes.  Buffers are never
//! shared between clips.
//!
//! # Example
//!
//! ```rust
//! use voice_augment::audio::WaveformBuffer;
//!
//! let buf = WaveformBuffer::new(vec![0, 100, -100, 0], 16_000, 2).unwrap();
//! assert_eq!(buf.frames(), 2);
//!
//! let louder = buf.gain_db(6.0);
//! assert!(louder.samples()[1] > 100);
//! ```

use super::resample::resample_channels;
use super::AudioError;

// ---------------------------------------------------------------------------
// WaveformBuffer
// ---------------------------------------------------------------------------

/// Interleaved signed 16-bit samples plus the header needed to interpret
/// them.
///
/// ## Invariants
///
/// * `sample_rate > 0` and `channels > 0`.
/// * `samples.len()` is a whole number of frames
///   (`samples.len() % channels == 0`).
///
/// Every constructor and transform upholds both, so a `WaveformBuffer`
/// obtained from this module is always internally consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl WaveformBuffer {
    /// Wrap `samples` recorded at `sample_rate` Hz with `channels`
    /// interleaved channels.
    ///
    /// # Errors
    ///
    /// [`AudioError::InvalidBuffer`] when the rate or channel count is zero,
    /// or when `samples` does not hold a whole number of frames.
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidBuffer("sample rate must be > 0".into()));
        }
        if channels == 0 {
            return Err(AudioError::InvalidBuffer("channel count must be > 0".into()));
        }
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::InvalidBuffer(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Zero-amplitude buffer lasting `duration_ms` milliseconds.
    ///
    /// The frame count is `round(duration_ms * sample_rate / 1000)`, so the
    /// result is exact to within one sample period.
    pub fn silent(duration_ms: u64, sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        let frames = (duration_ms as f64 * sample_rate as f64 / 1000.0).round() as usize;
        Self::new(vec![0; frames * channels as usize], sample_rate, channels)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration in whole milliseconds (floored).
    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1_000 / self.sample_rate as u64
    }

    /// Declare a new nominal sample rate without touching the samples.
    ///
    /// Playing the result back changes pitch and tempo together by
    /// `sample_rate / self.sample_rate()`.
    pub fn with_sample_rate(self, sample_rate: u32) -> Result<Self, AudioError> {
        Self::new(self.samples, sample_rate, self.channels)
    }

    /// Convert to `target_rate` Hz, keeping the playback duration.
    ///
    /// Returns an unchanged clone when the rate already matches.
    pub fn resample(&self, target_rate: u32) -> Result<Self, AudioError> {
        if target_rate == self.sample_rate {
            return Ok(self.clone());
        }
        if target_rate == 0 {
            return Err(AudioError::InvalidBuffer("target rate must be > 0".into()));
        }
        if self.is_empty() {
            return Self::new(Vec::new(), target_rate, self.channels);
        }

        let planar = self.deinterleave();
        let resampled = resample_channels(&planar, self.sample_rate, target_rate)?;
        Self::new(interleave(&resampled), target_rate, self.channels)
    }

    /// Scale every sample by `10^(delta_db / 20)`, saturating at the i16
    /// range instead of wrapping.
    pub fn gain_db(&self, delta_db: f64) -> Self {
        let factor = 10f64.powf(delta_db / 20.0);
        if factor == 1.0 {
            return self.clone();
        }
        let samples = self
            .samples
            .iter()
            .map(|&s| {
                (s as f64 * factor)
                    .round()
                    .clamp(i16::MIN as f64, i16::MAX as f64) as i16
            })
            .collect();
        Self {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Contiguous sub-range `[start_ms, end_ms)`.
    ///
    /// An `end_ms` at or past [`duration_ms`](Self::duration_ms) keeps the
    /// tail up to the last frame.  Degenerate windows (empty buffer, or a
    /// window that selects no frames) return an unchanged clone.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> Self {
        self.try_slice_ms(start_ms, end_ms)
            .unwrap_or_else(|| self.clone())
    }

    /// Like [`slice_ms`](Self::slice_ms), but `None` when the window selects
    /// no frames.  At low rates distinct millisecond bounds can land on the
    /// same frame.
    pub fn try_slice_ms(&self, start_ms: u64, end_ms: u64) -> Option<Self> {
        if self.is_empty() || start_ms >= end_ms {
            return None;
        }

        let frames = self.frames();
        let to_frame = |ms: u64| (ms as u128 * self.sample_rate as u128 / 1_000) as usize;

        let start = to_frame(start_ms).min(frames);
        let end = if end_ms >= self.duration_ms() {
            frames
        } else {
            to_frame(end_ms).min(frames)
        };
        if start >= end {
            return None;
        }

        let ch = self.channels as usize;
        Some(Self {
            samples: self.samples[start * ch..end * ch].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }

    /// Split into one normalised `f32` vector per channel.
    fn deinterleave(&self) -> Vec<Vec<f32>> {
        let ch = self.channels as usize;
        let mut planar = vec![Vec::with_capacity(self.frames()); ch];
        for frame in self.samples.chunks_exact(ch) {
            for (c, &s) in frame.iter().enumerate() {
                planar[c].push(s as f32 / 32_768.0);
            }
        }
        planar
    }
}

/// Inverse of `deinterleave`; channels are assumed equally long.
fn interleave(planar: &[Vec<f32>]) -> Vec<i16> {
    let frames = planar.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(frames * planar.len());
    for i in 0..frames {
        for channel in planar {
            let s = (channel[i] * 32_768.0).round().clamp(-32_768.0, 32_767.0);
            out.push(s as i16);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
