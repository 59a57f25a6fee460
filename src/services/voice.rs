use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;

const SERVICE: &str = "speech synthesis";

/// Text in, audio locator out. `Ok(None)` means synthesis is unavailable.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Option<String>, ServiceError>;
}

/// ElevenLabs text-to-speech. Audio is written under `output_dir` and the
/// returned locator is the web path the front door serves it from.
pub struct ElevenLabsVoice {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    voice_id: String,
    output_dir: PathBuf,
}

impl ElevenLabsVoice {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, voice_id: impl Into<String>, output_dir: PathBuf, timeout: Duration) -> Self {
        if api_key.is_none() {
            warn!("ELEVENLABS_API_KEY not set; voice disabled");
        }
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            voice_id: voice_id.into(),
            output_dir,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.elevenlabs_base_url.clone(),
            config.elevenlabs_api_key.clone(),
            config.voice_id.clone(),
            config.audio_dir.clone(),
            config.http_timeout,
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsVoice {
    async fn synthesize(&self, text: &str) -> Result<Option<String>, ServiceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let payload = json!({
            "text": text,
            "model_id": "eleven_monolingual_v1",
            "voice_settings": { "stability": 0.5, "similarity_boost": 0.5 }
        });

        let response = self
            .client
            .post(format!("{}/text-to-speech/{}", self.base_url, self.voice_id))
            .header("xi-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| ServiceError::Transport { service: SERVICE, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { service: SERVICE, status: status.as_u16(), body });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport { service: SERVICE, source })?;

        let id = Uuid::new_v4().simple().to_string();
        let filename = format!("response_{}.mp3", &id[..8]);
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(self.output_dir.join(&filename), &audio).await?;
        info!(file = %filename, bytes = audio.len(), "speech synthesized");

        Ok(Some(format!("/static/audio/{}", filename)))
    }
}
