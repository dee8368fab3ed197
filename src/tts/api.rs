//! OpenAI-compatible speech endpoint backend.
//!
//! `ApiSynthesizer` calls `POST {base_url}/v1/audio/speech` — OpenAI,
//! LocalAI, openedai-speech, Kokoro-FastAPI and any other server that speaks
//! the same wire format — and asks for a WAV response so the body can be
//! decoded directly.  All connection details come from [`TtsConfig`].

use async_trait::async_trait;

use crate::audio::{AudioCodec, WaveformBuffer, WavCodec};
use crate::config::TtsConfig;

use super::engine::{non_empty, SynthesisError, TextToSpeech};

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: TtsConfig,
}

impl ApiSynthesizer {
    /// Build an `ApiSynthesizer` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/audio/speech", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextToSpeech for ApiSynthesizer {
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn synthesize(&self, text: &str) -> Result<WaveformBuffer, SynthesisError> {
        let text = non_empty(text)?;

        let body = serde_json::json!({
            "model":           self.config.model,
            "input":           text,
            "voice":           self.config.voice,
            "response_format": "wav"
        });

        let mut req = self.client.post(self.endpoint()).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::debug!("TTS endpoint returned {} bytes for {text:?}", bytes.len());

        WavCodec
            .decode(&bytes)
            .map_err(|e| SynthesisError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
