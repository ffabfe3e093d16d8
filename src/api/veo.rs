use crate::api::{gemini::provider_error, GEMINI_API_BASE};
use crate::config::Config;
use crate::error::{Result, ShortsError};
use crate::pipeline::VideoSynthesizer;
use crate::{logi, logok};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::info;

const STYLE_PREFIX: &str =
    "Cinematic, dramatic lighting, intense colors, high sharpness, mysterious mood, \
     vertical 9:16 aspect ratio.";

/// Adapter for the long-running video generation call: submit one
/// request, poll the operation handle on a fixed interval, then fetch
/// the finished clip into the output directory.
#[derive(Debug, Clone)]
pub struct VeoClient {
    http: Client,
    api_key: String,
    model: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    output_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl VeoClient {
    pub fn new(http: Client, cfg: &Config) -> Self {
        Self {
            http,
            api_key: cfg.gemini_api_key.clone(),
            model: cfg.video_model.clone(),
            poll_interval: Duration::from_secs(cfg.poll_interval_secs),
            max_poll_attempts: cfg.max_poll_attempts,
            output_dir: PathBuf::from(&cfg.output_dir),
        }
    }

    /// Where fetched clips are written; the same configured directory
    /// the startup bootstrap ensures.
    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    pub async fn generate_video_clip(&self, prompt: &str) -> Result<PathBuf> {
        let operation = self.submit(prompt).await?;
        logi(format!("Video operation submitted: {}", operation.name));

        let finished = self.poll_until_done(operation).await?;
        let uri = extract_video_uri(finished.response.as_ref())
            .ok_or(ShortsError::AssetMissing)?;

        logi("Video ready; downloading clip...".to_string());
        let path = self.fetch_clip(&uri).await?;
        logok(format!("Saved clip: {}", path.display()));
        Ok(path)
    }

    async fn submit(&self, prompt: &str) -> Result<Operation> {
        let body = json!({
            "instances": [{"prompt": format!("{} {}", STYLE_PREFIX, prompt)}],
            "parameters": {
                "numberOfVideos": 1,
                "resolution": "1080p",
                "aspectRatio": "9:16"
            }
        });

        let url = format!(
            "{}/models/{}:predictLongRunning?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );

        info!(model = %self.model, "submitting video generation");
        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(provider_error(status.as_u16(), &text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Waits a fixed interval, then re-queries the operation, until it
    /// reports done. Bounded by `max_poll_attempts`; the source of this
    /// protocol had no bound at all, which is a hang waiting to happen.
    async fn poll_until_done(&self, mut operation: Operation) -> Result<Operation> {
        let mut attempts: u32 = 0;
        while !operation.done {
            if attempts >= self.max_poll_attempts {
                return Err(ShortsError::Timeout { attempts });
            }
            attempts += 1;

            tokio::time::sleep(self.poll_interval).await;
            info!(operation = %operation.name, attempt = attempts, "polling video operation");

            let url = format!("{}/{}?key={}", GEMINI_API_BASE, operation.name, self.api_key);
            let resp = self.http.get(&url).send().await?;
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(provider_error(status.as_u16(), &text));
            }

            operation = serde_json::from_str(&text)?;
        }

        if let Some(err) = operation.error.take() {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("video operation failed")
                .to_string();
            return Err(ShortsError::Provider(message));
        }

        Ok(operation)
    }

    async fn fetch_clip(&self, uri: &str) -> Result<PathBuf> {
        // The asset URI requires the same key as the generation call.
        let url = format!("{}&key={}", uri, self.api_key);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(provider_error(status.as_u16(), &text));
        }

        let bytes = resp.bytes().await?;
        fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(format!("short_{}.mp4", now_seed()));
        fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

#[async_trait]
impl VideoSynthesizer for VeoClient {
    async fn render(&self, prompt: &str) -> Result<PathBuf> {
        self.generate_video_clip(prompt).await
    }
}

fn now_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The finished operation carries the asset location at
/// response.generateVideoResponse.generatedSamples[0].video.uri; some
/// model versions spell the list generatedVideos instead.
fn extract_video_uri(response: Option<&Value>) -> Option<String> {
    let response = response?;
    let inner = response.get("generateVideoResponse").unwrap_or(response);
    let samples = inner
        .get("generatedSamples")
        .or_else(|| inner.get("generatedVideos"))?;
    samples
        .get(0)?
        .get("video")?
        .get("uri")?
        .as_str()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_uri_from_generated_samples() {
        let response = json!({
            "generateVideoResponse": {
                "generatedSamples": [{"video": {"uri": "https://example.test/v.mp4?alt=media"}}]
            }
        });
        assert_eq!(
            extract_video_uri(Some(&response)).unwrap(),
            "https://example.test/v.mp4?alt=media"
        );
    }

    #[test]
    fn extracts_uri_from_generated_videos_spelling() {
        let response = json!({
            "generatedVideos": [{"video": {"uri": "https://example.test/alt.mp4?alt=media"}}]
        });
        assert_eq!(
            extract_video_uri(Some(&response)).unwrap(),
            "https://example.test/alt.mp4?alt=media"
        );
    }

    #[test]
    fn missing_asset_yields_none() {
        assert!(extract_video_uri(None).is_none());
        assert!(extract_video_uri(Some(&json!({"generateVideoResponse": {}}))).is_none());
        assert!(extract_video_uri(Some(&json!({
            "generateVideoResponse": {"generatedSamples": []}
        })))
        .is_none());
    }

    #[test]
    fn operation_deserializes_with_defaults() {
        let op: Operation =
            serde_json::from_str(r#"{"name": "operations/abc123"}"#).unwrap();
        assert_eq!(op.name, "operations/abc123");
        assert!(!op.done);
        assert!(op.response.is_none());
        assert!(op.error.is_none());
    }

    #[tokio::test]
    async fn exhausted_poll_budget_is_a_timeout() {
        let cfg: crate::config::Config =
            serde_json::from_str(r#"{"gemini_api_key":"k","max_poll_attempts":0}"#).unwrap();
        let client = VeoClient::new(Client::new(), &cfg);
        let pending = Operation {
            name: "operations/never-done".to_string(),
            done: false,
            response: None,
            error: None,
        };

        // With a zero budget the loop must bail before sleeping or
        // touching the network.
        let err = client.poll_until_done(pending).await.unwrap_err();
        assert!(matches!(err, ShortsError::Timeout { attempts: 0 }));
    }

    #[tokio::test]
    async fn failed_operation_reports_the_provider_message() {
        let cfg: crate::config::Config =
            serde_json::from_str(r#"{"gemini_api_key":"k"}"#).unwrap();
        let client = VeoClient::new(Client::new(), &cfg);
        let failed = Operation {
            name: "operations/failed".to_string(),
            done: true,
            response: None,
            error: Some(json!({"code": 3, "message": "prompt was blocked"})),
        };

        let err = client.poll_until_done(failed).await.unwrap_err();
        match err {
            ShortsError::Provider(msg) => assert_eq!(msg, "prompt was blocked"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
