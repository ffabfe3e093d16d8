use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "gemini_api_key")]
    pub gemini_api_key: String,
    #[serde(default = "default_script_model")]
    pub script_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_script_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

// 120 polls at 5s = 10 minutes before giving up on a Veo operation.
fn default_max_poll_attempts() -> u32 {
    120
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Config {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        let config: Config = serde_json::from_str(&content)?;

        if config.gemini_api_key.is_empty() {
            anyhow::bail!("config.json: gemini_api_key missing");
        }
        if config.poll_interval_secs == 0 {
            anyhow::bail!("config.json: poll_interval_secs must be > 0");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"gemini_api_key":"k"}"#).unwrap();
        assert_eq!(cfg.script_model, "gemini-3-flash-preview");
        assert_eq!(cfg.tts_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(cfg.video_model, "veo-3.1-fast-generate-preview");
        assert_eq!(cfg.voice, "Kore");
        assert_eq!(cfg.poll_interval_secs, 5);
        assert_eq!(cfg.max_poll_attempts, 120);
        assert_eq!(cfg.output_dir, "output");
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"gemini_api_key":""}"#).await.unwrap();
        assert!(Config::load(&path).await.is_err());
    }
}
