//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`.
//! Every table is `#[serde(default)]`, so a settings file only needs the keys
//! it wants to override.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::augment::AugmentConfig;

// ---------------------------------------------------------------------------
// TtsBackend
// ---------------------------------------------------------------------------

/// Selects which engine synthesises the labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TtsBackend {
    /// Local engine run as a subprocess (espeak-ng by default).
    Command,
    /// Any OpenAI-compatible `/v1/audio/speech` service.
    OpenAiCompatible,
}

impl Default for TtsBackend {
    fn default() -> Self {
        Self::Command
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for the text-to-speech collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Which backend to use.
    pub backend: TtsBackend,
    /// Engine executable for [`TtsBackend::Command`].
    pub program: String,
    /// Voice name — an espeak voice (`"it"`) or an API voice (`"alloy"`).
    pub voice: String,
    /// Base URL for [`TtsBackend::OpenAiCompatible`].
    pub base_url: String,
    /// API key — `None` for local servers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"tts-1"`).
    pub model: String,
    /// Maximum seconds a single synthesis may take.
    pub timeout_secs: u64,
    /// Where the command backend writes its transient WAV files.  `None`
    /// means the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: TtsBackend::default(),
            program: "espeak-ng".into(),
            voice: "it".into(),
            base_url: "http://localhost:8880".into(),
            api_key: None,
            model: "tts-1".into(),
            timeout_secs: 30,
            scratch_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SilenceConfig
// ---------------------------------------------------------------------------

/// Settings for the silence ("no command") class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceConfig {
    /// Number of silence clips; `0` skips the class entirely.
    pub count: usize,
    /// Length of each clip in seconds.
    pub duration_secs: f32,
    /// Sample rate of the silence clips.
    pub sample_rate: u32,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            count: 3,
            duration_secs: 1.0,
            sample_rate: 16_000,
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetConfig
// ---------------------------------------------------------------------------

/// What to generate and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Folder receiving every clip (created if absent).
    pub output_dir: PathBuf,
    /// Label vocabulary; each label is synthesised verbatim.
    pub labels: Vec<String>,
    /// Augmented variants generated per label.
    pub num_repeats: usize,
    /// Fixed RNG seed.  `None` seeds from system entropy (non-reproducible).
    pub seed: Option<u64>,
    pub silence: SilenceConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test_dataset"),
            labels: ["destra", "sinistra", "su", "giù"]
                .into_iter()
                .map(String::from)
                .collect(),
            num_repeats: 3,
            seed: None,
            silence: SilenceConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_augment::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Write it back somewhere explicit
/// config.save_to("settings.toml".as_ref()).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    /// Augmentation probabilities and ranges.
    pub augment: AugmentConfig,
    pub tts: TtsConfig,
}

impl Default for AppConfig {
    /// Library augmentation defaults, except pitch fires 30 % of the time
    /// instead of 70 % for dataset runs.
    fn default() -> Self {
        let mut augment = AugmentConfig::default();
        augment.pitch.probability = 0.3;
        Self {
            dataset: DatasetConfig::default(),
            augment,
            tts: TtsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path and validate the result.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the generators cannot honour.
    pub fn validate(&self) -> Result<()> {
        self.augment.validate()?;

        let silence = &self.dataset.silence;
        if silence.sample_rate == 0 {
            bail!("silence.sample_rate must be > 0");
        }
        if !silence.duration_secs.is_finite() || silence.duration_secs < 0.0 {
            bail!(
                "silence.duration_secs must be a non-negative number, got {}",
                silence.duration_secs
            );
        }
        if self.tts.timeout_secs == 0 {
            bail!("tts.timeout_secs must be > 0");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
