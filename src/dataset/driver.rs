//! Whole-dataset run: every label, then the silence class.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use rand::Rng;

use crate::augment::{AugmentError, AugmentationPolicy};
use crate::config::{AppConfig, DatasetConfig};
use crate::tts::TextToSpeech;

use super::events::EventSender;
use super::{ClipGenerator, GenerateError, SilenceGenerator};

/// Files written by one [`DatasetDriver::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub clips: usize,
    pub silences: usize,
}

pub struct DatasetDriver {
    config: DatasetConfig,
    clips: ClipGenerator,
    silence: SilenceGenerator,
}

impl DatasetDriver {
    pub fn new(config: DatasetConfig, clips: ClipGenerator, silence: SilenceGenerator) -> Self {
        Self {
            config,
            clips,
            silence,
        }
    }

    /// Wire the generators from a loaded [`AppConfig`].
    pub fn from_config(
        config: &AppConfig,
        synthesizer: Arc<dyn TextToSpeech>,
    ) -> Result<Self, AugmentError> {
        let policy = AugmentationPolicy::new(config.augment)?;
        Ok(Self::new(
            config.dataset.clone(),
            ClipGenerator::new(synthesizer, policy),
            SilenceGenerator::from_config(&config.dataset.silence),
        ))
    }

    pub fn with_events(self, events: EventSender) -> Self {
        Self {
            clips: self.clips.with_events(events.clone()),
            silence: self.silence.with_events(events),
            config: self.config,
        }
    }

    /// Generate every label in order, then the silence clips.
    ///
    /// Labels share `rng`, so a fixed seed reproduces the whole dataset.
    /// The first failing label stops the run.
    pub async fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DatasetSummary, GenerateError> {
        let out = &self.config.output_dir;
        let mut summary = DatasetSummary::default();

        for label in &self.config.labels {
            info!("generating {} clips for {label:?}", self.config.num_repeats);
            let files = self
                .clips
                .generate(label, out, self.config.num_repeats, rng)
                .await?;
            summary.clips += files.len();
        }

        let silence = &self.config.silence;
        if silence.count > 0 {
            info!("generating {} silence clips", silence.count);
            let duration = Duration::try_from_secs_f32(silence.duration_secs).unwrap_or_default();
            summary.silences = self.silence.generate(out, silence.count, duration)?.len();
        }

        info!(
            "dataset complete in {}: {} clips, {} silence",
            out.display(),
            summary.clips,
            summary.silences
        );
        Ok(summary)
    }
}
