use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::errors::PipelineError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SERPER_BASE_URL: &str = "https://google.serper.dev";
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";
/// "George"
pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";
pub const DEFAULT_LOCATION: &str = "London";

/// Runtime configuration, read from the process environment only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub serper_api_key: Option<String>,
    pub serper_base_url: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    pub voice_id: String,
    pub data_dir: PathBuf,
    pub recommendations_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub location: String,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            serper_api_key: None,
            serper_base_url: DEFAULT_SERPER_BASE_URL.to_string(),
            elevenlabs_api_key: None,
            elevenlabs_base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            recommendations_dir: data_dir.join("recommendations"),
            audio_dir: data_dir.join("audio"),
            data_dir,
            location: DEFAULT_LOCATION.to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Process environment, after loading `.env` if one is present.
    /// Variables already set in the process win over the file.
    pub fn from_env() -> Result<Self, PipelineError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) => debug!("no .env file loaded: {}", e),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Self::from_env`] with an explicit dotenv file, read without
    /// touching the process environment.
    pub fn from_env_file(path: &Path) -> Result<Self, PipelineError> {
        let entries = dotenvy::from_path_iter(path)
            .map_err(|e| PipelineError::Config(format!("reading {}: {}", path.display(), e)))?;
        let mut file_vars = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| PipelineError::Config(format!("parsing {}: {}", path.display(), e)))?;
            file_vars.insert(key, value);
        }
        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let data_dir = get("EATWISE_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir);
        let recommendations_dir = get("EATWISE_RECOMMENDATIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("recommendations"));
        let audio_dir = get("EATWISE_AUDIO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("audio"));

        let http_timeout = match get("EATWISE_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    PipelineError::Config(format!("EATWISE_HTTP_TIMEOUT_SECS must be an integer, got '{}'", raw))
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            model: get("EATWISE_MODEL").unwrap_or(defaults.model),
            serper_api_key: get("SERPER_API_KEY"),
            serper_base_url: defaults.serper_base_url,
            elevenlabs_api_key: get("ELEVENLABS_API_KEY"),
            elevenlabs_base_url: defaults.elevenlabs_base_url,
            voice_id: get("ELEVENLABS_VOICE_ID").unwrap_or(defaults.voice_id),
            data_dir,
            recommendations_dir,
            audio_dir,
            location: get("EATWISE_LOCATION").unwrap_or(defaults.location),
            http_timeout,
        })
    }

    pub fn knowledge_snapshot_path(&self) -> PathBuf {
        self.data_dir.join("nutrition_store.json")
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("user_profile.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.location, "London");
        assert_eq!(config.recommendations_dir, PathBuf::from("data/recommendations"));
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn derived_dirs_follow_data_dir() {
        let vars: HashMap<&str, &str> = [("EATWISE_DATA_DIR", "/tmp/ew"), ("SERPER_API_KEY", "  ")].into();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.audio_dir, PathBuf::from("/tmp/ew/audio"));
        assert_eq!(config.knowledge_snapshot_path(), PathBuf::from("/tmp/ew/nutrition_store.json"));
        assert!(config.serper_api_key.is_none(), "blank key counts as unset");
    }

    #[test]
    fn dotenv_file_supplies_unset_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "EATWISE_MODEL=gpt-test\nEATWISE_LOCATION=\"Leeds\"\n").unwrap();

        let config = AppConfig::from_env_file(&path).unwrap();
        if env::var("EATWISE_MODEL").is_err() {
            assert_eq!(config.model, "gpt-test");
        }
        if env::var("EATWISE_LOCATION").is_err() {
            assert_eq!(config.location, "Leeds");
        }
        assert!(AppConfig::from_env_file(&dir.path().join("missing.env")).is_err());
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let result = AppConfig::from_lookup(|k| (k == "EATWISE_HTTP_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
