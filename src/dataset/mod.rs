//! Dataset generation — synthesis + augmentation + export.
//!
//! # Architecture
//!
//! ```text
//! DatasetDriver::run(rng)
//!        │
//!        ├─ for label in labels ──▶ ClipGenerator::generate
//!        │                            ├─ TextToSpeech::synthesize
//!        │                            ├─ AugmentationPolicy::apply
//!        │                            └─ write {label}_{i}.wav
//!        │
//!        └─ SilenceGenerator::generate ──▶ write silence_{i}.wav
//!
//! GenerationEvent (mpsc, optional) ───▶ any subscriber
//! ```
//!
//! Everything runs sequentially and fails fast: the first error stops the
//! run, and files written before it stay on disk.

pub mod clip;
pub mod driver;
pub mod events;
pub mod naming;
pub mod silence;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::AudioError;
use crate::augment::AugmentError;
use crate::tts::SynthesisError;

pub use clip::ClipGenerator;
pub use driver::{DatasetDriver, DatasetSummary};
pub use events::{EventSender, GenerationEvent};
pub use naming::{clip_path, silence_path};
pub use silence::SilenceGenerator;

// ---------------------------------------------------------------------------
// GenerateError
// ---------------------------------------------------------------------------

/// Errors that abort a generation call.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The label cannot be used as a file-name stem.
    #[error("invalid label {0:?}: must be non-empty and free of path separators")]
    InvalidLabel(String),

    /// The TTS collaborator failed for one repeat.
    #[error("synthesis of {label:?} failed: {source}")]
    Synthesis {
        label: String,
        #[source]
        source: SynthesisError,
    },

    /// The synthesised clip could not be augmented.
    #[error(transparent)]
    Augment(#[from] AugmentError),

    /// The final clip could not be encoded.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Creating the output directory or writing a file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Create `dir` and any missing parents; a no-op when it already exists.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), GenerateError> {
    std::fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))
}
