//! Synthesised voice-command dataset generator.
//!
//! Short spoken labels ("destra", "su", …) are synthesised through a
//! [`tts::TextToSpeech`] backend, passed through a randomised augmentation
//! chain and written to a flat, label-named folder of WAV files.
//!
//! # Pipeline
//!
//! ```text
//! label ──▶ TextToSpeech::synthesize ──▶ WaveformBuffer
//!       ──▶ AugmentationPolicy::apply  (speed → pitch → volume → trim)
//!       ──▶ WavCodec::encode ──▶ {output_dir}/{label}_{n}.wav
//! ```
//!
//! Silence clips skip synthesis and augmentation entirely and land in the
//! same folder as `silence_{n}.wav`.

pub mod audio;
pub mod augment;
pub mod config;
pub mod dataset;
pub mod tts;
