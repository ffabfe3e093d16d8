use crate::api::GEMINI_API_BASE;
use crate::config::Config;
use crate::error::{Result, ShortsError};
use crate::logw;
use crate::pipeline::{NarrationSynthesizer, ScriptGenerator};
use crate::script::VideoScript;
use crate::voice::VoiceName;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Adapter for the two generateContent calls: structured script
/// generation and audio-modality narration synthesis.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    script_model: String,
    tts_model: String,
}

impl GeminiClient {
    pub fn new(http: Client, cfg: &Config) -> Self {
        Self {
            http,
            api_key: cfg.gemini_api_key.clone(),
            script_model: cfg.script_model.clone(),
            tts_model: cfg.tts_model.clone(),
        }
    }

    pub async fn generate_video_script(&self, topic: &str) -> Result<VideoScript> {
        let prompt = format!(
            "Create a script for a short culinary-curiosity video about: {}.\n\
             The script needs a 3-second hook, mysterious narration, and detailed \
             visual descriptions for a video-generation model.\n\
             Return EXACTLY the requested JSON format.",
            topic
        );

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": script_response_schema(),
            }
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_BASE, self.script_model, self.api_key
        );

        info!(model = %self.script_model, "requesting video script");
        let raw = self.post_json(&url, &body).await?;

        let text = extract_candidate_text(&raw).ok_or_else(|| {
            log_body_snippet("script response had no candidate text", &raw);
            ShortsError::Schema("no candidate text in script response".to_string())
        })?;

        VideoScript::from_json(&text)
    }

    pub async fn generate_narration(&self, text: &str, voice: VoiceName) -> Result<String> {
        let body = json!({
            "contents": [{"parts": [{
                "text": format!("Say in a mysterious, rhythmic voice: {}", text)
            }]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": {"voiceName": voice.as_str()}
                    }
                }
            }
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_BASE, self.tts_model, self.api_key
        );

        info!(model = %self.tts_model, voice = voice.as_str(), "requesting narration audio");
        let raw = self.post_json(&url, &body).await?;

        match extract_inline_audio(&raw) {
            Some(data) if !data.is_empty() => Ok(data),
            _ => {
                log_body_snippet("speech response had no audio payload", &raw);
                Err(ShortsError::EmptyAudio)
            }
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        parse_envelope(status.as_u16(), &text)
    }
}

/// A non-success status or a body that is not JSON are both generic
/// service failures; only well-formed envelopes proceed.
fn parse_envelope(status: u16, body: &str) -> Result<Value> {
    if !(200..300).contains(&status) {
        return Err(provider_error(status, body));
    }
    serde_json::from_str(body).map_err(|_| provider_error(status, body))
}

#[async_trait]
impl ScriptGenerator for GeminiClient {
    async fn generate(&self, topic: &str) -> Result<VideoScript> {
        self.generate_video_script(topic).await
    }
}

#[async_trait]
impl NarrationSynthesizer for GeminiClient {
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<String> {
        self.generate_narration(text, voice).await
    }
}

/// The fixed response schema the script call requests. The provider
/// does not enforce it server-side, so `VideoScript::from_json` still
/// validates everything on arrival.
fn script_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "hook": {"type": "STRING"},
            "narration": {"type": "STRING"},
            "finalQuestion": {"type": "STRING"},
            "scenes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "visualPrompt": {"type": "STRING"},
                        "displayText": {"type": "STRING"},
                        "durationSeconds": {"type": "NUMBER"}
                    },
                    "required": ["visualPrompt", "displayText", "durationSeconds"]
                }
            }
        },
        "required": ["title", "hook", "narration", "finalQuestion", "scenes"]
    })
}

/// candidates[0].content.parts[0].text
fn extract_candidate_text(root: &Value) -> Option<String> {
    first_part(root)?
        .get("text")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// candidates[0].content.parts[0].inlineData.data
fn extract_inline_audio(root: &Value) -> Option<String> {
    first_part(root)?
        .get("inlineData")
        .and_then(|d| d.get("data"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn first_part(root: &Value) -> Option<&Value> {
    root.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
}

pub(crate) fn provider_error(status: u16, body: &str) -> ShortsError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| {
            let snippet = body.chars().take(200).collect::<String>();
            format!("HTTP {}: {}", status, snippet)
        });
    ShortsError::Provider(message)
}

fn log_body_snippet(reason: &str, raw: &Value) {
    let snippet = raw.to_string().chars().take(800).collect::<String>();
    logw(format!("{} (body starts: {})", reason, snippet));
}
