//! The silence ("no command") class.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::audio::{AudioCodec, WavCodec, WaveformBuffer, CANONICAL_SAMPLE_RATE};
use crate::config::SilenceConfig;

use super::events::{emit, EventSender, GenerationEvent};
use super::naming::silence_path;
use super::{ensure_dir, GenerateError};

/// Writes all-zero clips as `silence_{i}.{ext}`.
///
/// Silence is deterministic and never augmented, so no RNG is involved.
pub struct SilenceGenerator {
    codec: Arc<dyn AudioCodec>,
    sample_rate: u32,
    channels: u16,
    events: Option<EventSender>,
}

impl Default for SilenceGenerator {
    fn default() -> Self {
        Self {
            codec: Arc::new(WavCodec),
            sample_rate: CANONICAL_SAMPLE_RATE,
            channels: 1,
            events: None,
        }
    }
}

impl SilenceGenerator {
    pub fn from_config(config: &SilenceConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            ..Self::default()
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn AudioCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Write `num_repeats` clips of `duration` each.
    ///
    /// `num_repeats == 0` writes nothing and does not create the directory.
    pub fn generate(
        &self,
        output_dir: &Path,
        num_repeats: usize,
        duration: Duration,
    ) -> Result<Vec<PathBuf>, GenerateError> {
        if num_repeats == 0 {
            return Ok(Vec::new());
        }
        ensure_dir(output_dir)?;

        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let clip = WaveformBuffer::silent(duration_ms, self.sample_rate, self.channels)?;
        let bytes = self.codec.encode(&clip)?;

        let mut written = Vec::with_capacity(num_repeats);
        for index in 1..=num_repeats {
            let path = silence_path(output_dir, index, self.codec.extension());
            std::fs::write(&path, &bytes).map_err(|e| GenerateError::io(&path, e))?;
            info!("saved {} ({duration_ms} ms silence)", path.display());

            emit(
                self.events.as_ref(),
                GenerationEvent::SilenceSaved {
                    index,
                    path: path.clone(),
                },
            );
            written.push(path);
        }
        Ok(written)
    }
}
