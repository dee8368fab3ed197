//! Per-effect probabilities and parameter ranges.
//!
//! Built once per run (or per label), never mutated, and handed to
//! [`AugmentationPolicy`](super::AugmentationPolicy) by value.  Serialises to
//! the `[augment]` table of `settings.toml`:
//!
//! ```toml
//! [augment.speed]
//! probability = 0.7
//! range = [0.8, 1.2]
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::AugmentError;

// ---------------------------------------------------------------------------
// EffectConfig
// ---------------------------------------------------------------------------

/// Probability of applying one effect plus the inclusive range its
/// parameter is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Chance in `[0.0, 1.0]` that the effect fires for a given clip.
    pub probability: f64,
    /// `(min, max)` of the uniformly drawn parameter.
    pub range: (f64, f64),
}

impl EffectConfig {
    pub const fn new(probability: f64, min: f64, max: f64) -> Self {
        Self {
            probability,
            range: (min, max),
        }
    }

    /// Same range, probability zero.
    pub const fn disabled(self) -> Self {
        Self {
            probability: 0.0,
            ..self
        }
    }

    /// Same range, probability one.
    pub const fn always(self) -> Self {
        Self {
            probability: 1.0,
            ..self
        }
    }

    /// Bernoulli draw against `probability`.
    ///
    /// Always consumes exactly one value from `rng`, so decisions for later
    /// effects do not depend on whether this one fired.
    pub fn fires<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.probability
    }

    /// Uniform draw from `range` (inclusive).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (min, max) = self.range;
        rng.gen_range(min..=max)
    }

    fn validate(&self, name: &str) -> Result<(), AugmentError> {
        let (min, max) = self.range;
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(AugmentError::InvalidConfig(format!(
                "{name}: probability {} outside [0, 1]",
                self.probability
            )));
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(AugmentError::InvalidConfig(format!(
                "{name}: range ({min}, {max}) must be finite with min <= max"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AugmentConfig
// ---------------------------------------------------------------------------

/// One [`EffectConfig`] per step of the chain.
///
/// | Effect | Parameter | Default range | Default p |
/// |--------|-----------|---------------|-----------|
/// | speed  | playback factor | 0.8 – 1.2 | 0.7 |
/// | pitch  | semitones | −5 – 5 | 0.7 |
/// | volume | gain dB | −10 – 5 | 0.5 |
/// | trim   | (max start fraction, min end fraction) | 0.2, 0.8 | 0.3 |
///
/// The trim "range" is not sampled directly: the start cut is drawn from
/// `[0, range.0 × duration]` and the end cut from
/// `[range.1 × duration, duration]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    pub speed: EffectConfig,
    pub pitch: EffectConfig,
    pub volume: EffectConfig,
    pub trim: EffectConfig,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            speed: EffectConfig::new(0.7, 0.8, 1.2),
            pitch: EffectConfig::new(0.7, -5.0, 5.0),
            volume: EffectConfig::new(0.5, -10.0, 5.0),
            trim: EffectConfig::new(0.3, 0.2, 0.8),
        }
    }
}

impl AugmentConfig {
    /// Default ranges with every probability set to zero — the chain becomes
    /// an exact no-op.
    pub fn disabled() -> Self {
        let d = Self::default();
        Self {
            speed: d.speed.disabled(),
            pitch: d.pitch.disabled(),
            volume: d.volume.disabled(),
            trim: d.trim.disabled(),
        }
    }

    /// Reject configs that would make sampling panic or produce nonsense.
    pub fn validate(&self) -> Result<(), AugmentError> {
        self.speed.validate("speed")?;
        self.pitch.validate("pitch")?;
        self.volume.validate("volume")?;
        self.trim.validate("trim")?;

        if self.speed.range.0 <= 0.0 {
            return Err(AugmentError::InvalidConfig(
                "speed: factors must be > 0".into(),
            ));
        }
        let (max_start, min_end) = self.trim.range;
        if max_start < 0.0 || min_end > 1.0 {
            return Err(AugmentError::InvalidConfig(
                "trim: fractions must lie within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
