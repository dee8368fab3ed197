//! Core `TextToSpeech` trait and its error type.
//!
//! # Overview
//!
//! [`TextToSpeech`] is the only thing the dataset generators know about
//! synthesis.  It is object-safe and `Send + Sync` so it can be held behind
//! an `Arc<dyn TextToSpeech>`.
//!
//! [`MockSynthesizer`] (available under `#[cfg(test)]`) returns a
//! pre-configured buffer without touching any engine — useful for testing
//! the generators without espeak-ng or a network service.

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::WaveformBuffer;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// All errors that can arise from a TTS backend.
#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    /// The text to synthesise was empty or whitespace only.
    #[error("nothing to synthesise: text is empty")]
    EmptyText,

    /// HTTP transport or connection error.
    #[error("TTS request failed: {0}")]
    Request(String),

    /// The backend did not answer within the configured timeout.
    #[error("TTS request timed out")]
    Timeout,

    /// The engine ran but reported failure (non-zero exit, HTTP error
    /// status, missing binary …).
    #[error("TTS backend failed: {0}")]
    Backend(String),

    /// The engine's output was not a readable audio container.
    #[error("could not decode synthesised audio: {0}")]
    Decode(String),

    /// Reading or deleting the transient synthesis artifact failed.
    #[error("TTS scratch file error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else if e.is_status() {
            SynthesisError::Backend(e.to_string())
        } else {
            SynthesisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextToSpeech trait
// ---------------------------------------------------------------------------

/// Turns a text label into a raw, un-augmented waveform.
///
/// # Contract
///
/// - Returns `Err(SynthesisError::EmptyText)` for blank input without
///   contacting the backend.
/// - The returned buffer may have any sample rate and channel count; the
///   augmentation chain normalises rate where it needs to.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<WaveformBuffer, SynthesisError>;
}

// Compile-time assertion: Box<dyn TextToSpeech> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TextToSpeech>) {}
};

/// Trimmed `text`, or [`SynthesisError::EmptyText`].
pub(crate) fn non_empty(text: &str) -> Result<&str, SynthesisError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(SynthesisError::EmptyText)
    } else {
        Ok(trimmed)
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that hands back a fixed buffer and records what it was
/// asked to say.
#[cfg(test)]
pub struct MockSynthesizer {
    response: Result<WaveformBuffer, SynthesisError>,
    /// 1-based call number that fails with `Backend`, if any.
    fail_on_call: Option<usize>,
    requests: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockSynthesizer {
    /// Always returns `Ok(buffer.clone())`.
    pub fn ok(buffer: WaveformBuffer) -> Self {
        Self {
            response: Ok(buffer),
            fail_on_call: None,
            requests: Default::default(),
        }
    }

    /// Always returns `Err(error)`.
    pub fn err(error: SynthesisError) -> Self {
        Self {
            response: Err(error),
            fail_on_call: None,
            requests: Default::default(),
        }
    }

    /// Succeeds except on the `call`-th request (1-based).
    pub fn failing_on(buffer: WaveformBuffer, call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::ok(buffer)
        }
    }

    /// Texts received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl TextToSpeech for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<WaveformBuffer, SynthesisError> {
        let text = non_empty(text)?;
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(text.to_string());
            requests.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(SynthesisError::Backend(format!("mock failure on call {call}")));
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
