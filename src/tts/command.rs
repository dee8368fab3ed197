//! Local TTS engine run as a subprocess.
//!
//! The engine is invoked espeak-style:
//!
//! ```text
//! <program> -v <voice> -w <scratch>/tts_<pid>_<n>.wav <text>
//! ```
//!
//! which fits `espeak-ng` and `espeak` out of the box.  The WAV it writes is
//! a transient artifact: it is read, decoded and deleted before
//! `synthesize` returns, whether or not decoding succeeded.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::audio::{AudioCodec, WaveformBuffer, WavCodec};
use crate::config::TtsConfig;

use super::engine::{non_empty, SynthesisError, TextToSpeech};

// ---------------------------------------------------------------------------
// CommandSynthesizer
// ---------------------------------------------------------------------------

pub struct CommandSynthesizer {
    program: String,
    voice: String,
    scratch_dir: PathBuf,
    timeout: Duration,
    counter: AtomicUsize,
}

impl CommandSynthesizer {
    /// Build from config; the scratch directory defaults to the system temp
    /// dir when `config.scratch_dir` is unset.
    pub fn from_config(config: &TtsConfig) -> Self {
        Self {
            program: config.program.clone(),
            voice: config.voice.clone(),
            scratch_dir: config
                .scratch_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            timeout: Duration::from_secs(config.timeout_secs),
            counter: AtomicUsize::new(0),
        }
    }

    fn next_scratch_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        self.scratch_dir
            .join(format!("tts_{}_{n}.wav", std::process::id()))
    }

    async fn run_engine(&self, text: &str, out: &Path) -> Result<(), SynthesisError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-v")
            .arg(&self.voice)
            .arg("-w")
            .arg(out)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| SynthesisError::Timeout)?
            .map_err(|e| SynthesisError::Backend(format!("cannot run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SynthesisError::Backend(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TextToSpeech for CommandSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<WaveformBuffer, SynthesisError> {
        let text = non_empty(text)?;
        let scratch = self.next_scratch_path();

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|e| SynthesisError::Io(format!("{}: {e}", self.scratch_dir.display())))?;

        let result = async {
            self.run_engine(text, &scratch).await?;
            let bytes = tokio::fs::read(&scratch)
                .await
                .map_err(|e| SynthesisError::Io(format!("{}: {e}", scratch.display())))?;
            WavCodec
                .decode(&bytes)
                .map_err(|e| SynthesisError::Decode(e.to_string()))
        }
        .await;

        if scratch.exists() {
            if let Err(e) = tokio::fs::remove_file(&scratch).await {
                log::warn!("could not delete {}: {e}", scratch.display());
            }
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
