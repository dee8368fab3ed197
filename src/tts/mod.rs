//! Text-to-speech backends.
//!
//! This module provides:
//! * [`TextToSpeech`] — async trait implemented by every backend.
//! * [`CommandSynthesizer`] — local engine subprocess (espeak-ng by default).
//! * [`ApiSynthesizer`] — OpenAI-compatible `/v1/audio/speech` endpoint.
//! * [`SynthesisError`] — error variants for synthesis.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_augment::config::AppConfig;
//! use voice_augment::tts;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let synthesizer = tts::from_config(&config.tts);
//!     let clip = synthesizer.synthesize("destra").await.unwrap();
//!     println!("{} ms @ {} Hz", clip.duration_ms(), clip.sample_rate());
//! }
//! ```

pub mod api;
pub mod command;
pub mod engine;

use std::sync::Arc;

use crate::config::{TtsBackend, TtsConfig};

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use api::ApiSynthesizer;
pub use command::CommandSynthesizer;
pub use engine::{SynthesisError, TextToSpeech};

// test-only re-export so the dataset tests can import MockSynthesizer
// without `use crate::tts::engine::MockSynthesizer`.
#[cfg(test)]
pub use engine::MockSynthesizer;

/// Build the backend selected by `config.backend`.
pub fn from_config(config: &TtsConfig) -> Arc<dyn TextToSpeech> {
    match config.backend {
        TtsBackend::Command => Arc::new(CommandSynthesizer::from_config(config)),
        TtsBackend::OpenAiCompatible => Arc::new(ApiSynthesizer::from_config(config)),
    }
}
