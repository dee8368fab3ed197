//! Application entry point — voice-command dataset generator.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from the path given as first argument, or from the
//!    platform `settings.toml` (returns default on first run).
//! 3. Build the TTS backend selected in `[tts]`.
//! 4. Seed the RNG (`dataset.seed`, or system entropy).
//! 5. Spawn an event logger and run the [`DatasetDriver`] to completion.

use std::path::PathBuf;

use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::mpsc;
use voice_augment::{
    config::AppConfig,
    dataset::{DatasetDriver, GenerationEvent},
    tts,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice-augment starting up");

    // 2. Configuration
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => AppConfig::load_from(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };

    // 3. TTS backend
    let synthesizer = tts::from_config(&config.tts);
    log::info!("TTS backend: {:?} (voice {:?})", config.tts.backend, config.tts.voice);

    // 4. RNG
    let mut rng = match config.dataset.seed {
        Some(seed) => {
            log::info!("RNG seed: {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // 5. Run
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let logger = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let GenerationEvent::LabelFinished { label, files } = event {
                log::debug!("{label:?}: {files} files");
            }
        }
    });

    let driver = DatasetDriver::from_config(&config, synthesizer)
        .context("invalid augmentation settings")?
        .with_events(event_tx);

    let result = driver.run(&mut rng).await;
    drop(driver);
    let _ = logger.await;

    match result {
        Ok(summary) => {
            log::info!(
                "Wrote {} clips and {} silence files to {}",
                summary.clips,
                summary.silences,
                config.dataset.output_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Dataset generation failed: {e}");
            Err(e.into())
        }
    }
}
