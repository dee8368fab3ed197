//! Augmented clips for one label.
//!
//! Every repeat is synthesised afresh and augmented with its own draws from
//! the shared RNG stream, so no two repeats share a decision.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use rand::Rng;

use crate::audio::{AudioCodec, WavCodec};
use crate::augment::{Augmented, AugmentationPolicy};
use crate::tts::TextToSpeech;

use super::events::{emit, EventSender, GenerationEvent};
use super::naming::{clip_path, validate_label};
use super::{ensure_dir, GenerateError};

// ---------------------------------------------------------------------------
// ClipGenerator
// ---------------------------------------------------------------------------

/// Synthesis → augmentation → export, `num_repeats` times per label.
///
/// ```rust,no_run
/// use rand::{rngs::StdRng, SeedableRng};
/// use voice_augment::augment::{AugmentConfig, AugmentationPolicy};
/// use voice_augment::config::TtsConfig;
/// use voice_augment::dataset::ClipGenerator;
/// use voice_augment::tts;
///
/// # async fn example() {
/// let policy = AugmentationPolicy::new(AugmentConfig::default()).unwrap();
/// let clips = ClipGenerator::new(tts::from_config(&TtsConfig::default()), policy);
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let files = clips
///     .generate("su", "dataset".as_ref(), 3, &mut rng)
///     .await
///     .unwrap();
/// assert_eq!(files.len(), 3); // dataset/su_1.wav … su_3.wav
/// # }
/// ```
pub struct ClipGenerator {
    synthesizer: Arc<dyn TextToSpeech>,
    codec: Arc<dyn AudioCodec>,
    policy: AugmentationPolicy,
    events: Option<EventSender>,
}

impl ClipGenerator {
    /// Generator exporting WAV files.
    pub fn new(synthesizer: Arc<dyn TextToSpeech>, policy: AugmentationPolicy) -> Self {
        Self {
            synthesizer,
            codec: Arc::new(WavCodec),
            policy,
            events: None,
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn AudioCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Report every saved clip on `events`.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Write `output_dir/{label}_{1..=num_repeats}.{ext}`.
    ///
    /// The directory is created first if missing; existing files with the
    /// same names are overwritten.  Returns the written paths in order.
    ///
    /// # Errors
    ///
    /// The first failure of any repeat aborts the call; files already written
    /// are left in place.
    pub async fn generate<R: Rng + ?Sized>(
        &self,
        label: &str,
        output_dir: &Path,
        num_repeats: usize,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>, GenerateError> {
        validate_label(label)?;
        ensure_dir(output_dir)?;

        let mut written = Vec::with_capacity(num_repeats);
        for index in 1..=num_repeats {
            let raw = self
                .synthesizer
                .synthesize(label)
                .await
                .map_err(|source| GenerateError::Synthesis {
                    label: label.to_string(),
                    source,
                })?;

            let Augmented { buffer, decision } = self.policy.apply(&raw, rng)?;

            let path = clip_path(output_dir, label, index, self.codec.extension());
            let bytes = self.codec.encode(&buffer)?;
            std::fs::write(&path, bytes).map_err(|e| GenerateError::io(&path, e))?;
            info!("saved {} ({decision})", path.display());

            emit(
                self.events.as_ref(),
                GenerationEvent::ClipSaved {
                    label: label.to_string(),
                    index,
                    path: path.clone(),
                    decision,
                },
            );
            written.push(path);
        }

        emit(
            self.events.as_ref(),
            GenerationEvent::LabelFinished {
                label: label.to_string(),
                files: written.len(),
            },
        );
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioError, RawPcmCodec, WaveformBuffer};
    use crate::augment::{AugmentConfig, AugmentError};
    use crate::tts::{MockSynthesizer, SynthesisError};
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    fn voice() -> WaveformBuffer {
        let samples = (0..11_025)
            .map(|i| (((i as f64) * 0.05).sin() * 6_000.0) as i16)
            .collect();
        WaveformBuffer::new(samples, 22_050, 1).unwrap()
    }

    fn generator(tts: MockSynthesizer, augment: AugmentConfig) -> ClipGenerator {
        ClipGenerator::new(Arc::new(tts), AugmentationPolicy::new(augment).unwrap())
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn three_repeats_produce_three_decodable_files() {
        let dir = tempdir().expect("temp dir");
        let clips = generator(MockSynthesizer::ok(voice()), AugmentConfig::default());

        let files = clips
            .generate("su", dir.path(), 3, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();

        assert_eq!(listing(dir.path()), vec!["su_1.wav", "su_2.wav", "su_3.wav"]);
        assert_eq!(files.len(), 3);
        for path in &files {
            let buf = WavCodec.decode(&std::fs::read(path).unwrap()).unwrap();
            assert!(buf.duration_ms() > 0, "{}", path.display());
        }
    }

    #[tokio::test]
    async fn every_repeat_synthesises_the_label() {
        let dir = tempdir().expect("temp dir");
        let tts = Arc::new(MockSynthesizer::ok(voice()));
        let clips = ClipGenerator::new(
            tts.clone(),
            AugmentationPolicy::new(AugmentConfig::disabled()).unwrap(),
        );

        clips
            .generate("destra", dir.path(), 2, &mut StdRng::seed_from_u64(2))
            .await
            .unwrap();
        assert_eq!(tts.requests(), vec!["destra", "destra"]);
    }

    #[tokio::test]
    async fn disabled_augmentation_exports_the_raw_clip() {
        let dir = tempdir().expect("temp dir");
        let clips = generator(MockSynthesizer::ok(voice()), AugmentConfig::disabled());
        let files = clips
            .generate("su", dir.path(), 1, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();
        let exported = WavCodec.decode(&std::fs::read(&files[0]).unwrap()).unwrap();
        assert_eq!(exported, voice());
    }

    #[tokio::test]
    async fn missing_output_dir_is_created_and_reuse_is_idempotent() {
        let root = tempdir().expect("temp dir");
        let dir = root.path().join("nested").join("out");
        let clips = generator(MockSynthesizer::ok(voice()), AugmentConfig::default());
        let mut rng = StdRng::seed_from_u64(4);

        clips.generate("su", &dir, 1, &mut rng).await.unwrap();
        clips.generate("su", &dir, 2, &mut rng).await.unwrap();
        assert_eq!(listing(&dir), vec!["su_1.wav", "su_2.wav"]);
    }

    #[tokio::test]
    async fn synthesis_failure_is_fatal_and_keeps_earlier_files() {
        let dir = tempdir().expect("temp dir");
        let clips = generator(MockSynthesizer::failing_on(voice(), 2), AugmentConfig::default());

        let err = clips
            .generate("giù", dir.path(), 3, &mut StdRng::seed_from_u64(5))
            .await
            .unwrap_err();

        match err {
            GenerateError::Synthesis { label, source } => {
                assert_eq!(label, "giù");
                assert!(matches!(source, SynthesisError::Backend(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(listing(dir.path()), vec!["giù_1.wav"]);
    }

    #[tokio::test]
    async fn empty_synthesis_is_invalid_buffer() {
        let dir = tempdir().expect("temp dir");
        let empty = WaveformBuffer::new(Vec::new(), 22_050, 1).unwrap();
        let clips = generator(MockSynthesizer::ok(empty), AugmentConfig::default());

        let err = clips
            .generate("su", dir.path(), 1, &mut StdRng::seed_from_u64(6))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Augment(AugmentError::Audio(AudioError::InvalidBuffer(_)))
        ));
        assert!(listing(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn unsafe_label_is_rejected_before_touching_disk() {
        let root = tempdir().expect("temp dir");
        let dir = root.path().join("never");
        let clips = generator(MockSynthesizer::ok(voice()), AugmentConfig::default());

        let err = clips
            .generate("../escape", &dir, 1, &mut StdRng::seed_from_u64(7))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidLabel(_)));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn same_seed_reproduces_identical_files() {
        let a = tempdir().expect("temp dir");
        let b = tempdir().expect("temp dir");
        let clips = generator(MockSynthesizer::ok(voice()), AugmentConfig::default());

        clips
            .generate("su", a.path(), 3, &mut StdRng::seed_from_u64(8))
            .await
            .unwrap();
        clips
            .generate("su", b.path(), 3, &mut StdRng::seed_from_u64(8))
            .await
            .unwrap();

        for i in 1..=3 {
            let name = format!("su_{i}.wav");
            assert_eq!(
                std::fs::read(a.path().join(&name)).unwrap(),
                std::fs::read(b.path().join(&name)).unwrap()
            );
        }
    }

    #[tokio::test]
    async fn events_report_each_clip_then_the_label() {
        let dir = tempdir().expect("temp dir");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let clips =
            generator(MockSynthesizer::ok(voice()), AugmentConfig::default()).with_events(tx);

        clips
            .generate("su", dir.path(), 2, &mut StdRng::seed_from_u64(9))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, GenerationEvent::ClipSaved { index: 1, .. }));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, GenerationEvent::ClipSaved { index: 2, .. }));
        assert_eq!(
            rx.recv().await.unwrap(),
            GenerationEvent::LabelFinished {
                label: "su".into(),
                files: 2
            }
        );
    }

    #[tokio::test]
    async fn custom_codec_sets_format_and_extension() {
        let dir = tempdir().expect("temp dir");
        let clip = WaveformBuffer::new(vec![5, -5, 10, -10], 16_000, 1).unwrap();
        let clips = generator(MockSynthesizer::ok(clip.clone()), AugmentConfig::disabled())
            .with_codec(Arc::new(RawPcmCodec));

        let files = clips
            .generate("su", dir.path(), 2, &mut StdRng::seed_from_u64(10))
            .await
            .unwrap();

        assert_eq!(listing(dir.path()), vec!["su_1.raw", "su_2.raw"]);
        let bytes = std::fs::read(&files[0]).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(RawPcmCodec.decode(&bytes).unwrap(), clip);
    }
}
