//! Randomised augmentation chain for synthesised clips.
//!
//! # Architecture
//!
//! ```text
//! AugmentConfig (per-effect probability + range, immutable)
//!        │
//!        ▼
//! AugmentationPolicy::apply(buffer, rng)
//!        │  speed  ── reinterpret rate × factor  → resample 16 kHz
//!        │  pitch  ── reinterpret rate × 2^(st/12) → resample 16 kHz
//!        │  volume ── gain 10^(dB/20), saturating
//!        │  trim   ── keep [start, end) of the *current* duration
//!        ▼
//! Augmented { buffer, decision: AugmentationDecision }
//! ```
//!
//! The order is fixed; every later step sees the output of the previous one.
//! [`AugmentationPolicy::apply_decision`] replays a recorded decision without
//! any randomness.
//!
//! # Quick start
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use voice_augment::audio::WaveformBuffer;
//! use voice_augment::augment::{AugmentConfig, AugmentationPolicy};
//!
//! let policy = AugmentationPolicy::new(AugmentConfig::default()).unwrap();
//! let clip = WaveformBuffer::silent(800, 22_050, 1).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let out = policy.apply(&clip, &mut rng).unwrap();
//! println!("{}", out.decision);
//! ```

pub mod decision;
pub mod effects;
pub mod policy;

use thiserror::Error;

use crate::audio::AudioError;

pub use decision::{AugmentationDecision, TrimWindow};
pub use effects::{AugmentConfig, EffectConfig};
pub use policy::{Augmented, AugmentationPolicy};

// ---------------------------------------------------------------------------
// AugmentError
// ---------------------------------------------------------------------------

/// Errors raised by the augmentation chain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AugmentError {
    /// An [`EffectConfig`] holds a probability or range that cannot be
    /// sampled.
    #[error("invalid augmentation config: {0}")]
    InvalidConfig(String),

    /// The input buffer was rejected or a transform failed.
    #[error(transparent)]
    Audio(#[from] AudioError),
}
