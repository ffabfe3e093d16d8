use crate::error::{Result, ShortsError};
use serde::{Deserialize, Serialize};

/// The structured script the text model returns for one topic.
/// Immutable once parsed; owned by the pipeline for the run's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoScript {
    pub title: String,
    pub hook: String,
    pub narration: String,
    pub final_question: String,
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub visual_prompt: String,
    pub display_text: String,
    pub duration_seconds: f64,
}

impl VideoScript {
    /// Parses and validates the model's JSON output. The schema is
    /// provider-supplied and not enforced remotely, so a missing or
    /// mistyped field must surface as a `Schema` error here rather
    /// than a partial object downstream.
    pub fn from_json(text: &str) -> Result<Self> {
        let script: VideoScript = serde_json::from_str(text)
            .map_err(|e| ShortsError::Schema(format!("invalid script response: {}", e)))?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        if self.scenes.is_empty() {
            return Err(ShortsError::Schema("script has no scenes".to_string()));
        }
        for (idx, scene) in self.scenes.iter().enumerate() {
            if scene.duration_seconds <= 0.0 {
                return Err(ShortsError::Schema(format!(
                    "scene {} has non-positive duration {}",
                    idx, scene.duration_seconds
                )));
            }
        }
        Ok(())
    }

    /// Narration text for the TTS stage: hook, body and final question
    /// read back to back.
    pub fn narration_text(&self) -> String {
        format!("{}. {}. {}", self.hook, self.narration, self.final_question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> String {
        r#"{
            "title": "The 3000-Year-Old Honey",
            "hook": "This honey never spoiled.",
            "narration": "Sealed in Egyptian tombs, jars of honey survived three millennia.",
            "finalQuestion": "Would you taste it?",
            "scenes": [
                {"visualPrompt": "golden honey dripping in torchlight", "displayText": "STILL EDIBLE", "durationSeconds": 5.0},
                {"visualPrompt": "ancient clay jars in a dark tomb", "displayText": "3000 YEARS", "durationSeconds": 4.0}
            ]
        }"#
        .to_string()
    }

    #[test]
    fn parses_a_valid_script() {
        let script = VideoScript::from_json(&valid_json()).unwrap();
        assert_eq!(script.title, "The 3000-Year-Old Honey");
        assert_eq!(script.scenes.len(), 2);
        assert_eq!(script.scenes[0].display_text, "STILL EDIBLE");
    }

    #[test]
    fn missing_scenes_is_a_schema_error() {
        let json = r#"{"title":"t","hook":"h","narration":"n","finalQuestion":"q"}"#;
        let err = VideoScript::from_json(json).unwrap_err();
        assert!(matches!(err, ShortsError::Schema(_)));
    }

    #[test]
    fn empty_scenes_is_a_schema_error() {
        let json = r#"{"title":"t","hook":"h","narration":"n","finalQuestion":"q","scenes":[]}"#;
        let err = VideoScript::from_json(json).unwrap_err();
        assert!(matches!(err, ShortsError::Schema(_)));
    }

    #[test]
    fn mistyped_duration_is_a_schema_error() {
        let json = r#"{"title":"t","hook":"h","narration":"n","finalQuestion":"q",
            "scenes":[{"visualPrompt":"v","displayText":"d","durationSeconds":"five"}]}"#;
        assert!(matches!(VideoScript::from_json(json), Err(ShortsError::Schema(_))));
    }

    #[test]
    fn non_positive_duration_is_a_schema_error() {
        let json = r#"{"title":"t","hook":"h","narration":"n","finalQuestion":"q",
            "scenes":[{"visualPrompt":"v","displayText":"d","durationSeconds":0.0}]}"#;
        assert!(matches!(VideoScript::from_json(json), Err(ShortsError::Schema(_))));
    }

    #[test]
    fn not_json_is_a_schema_error() {
        assert!(matches!(
            VideoScript::from_json("Sure! Here is your script:"),
            Err(ShortsError::Schema(_))
        ));
    }

    #[test]
    fn narration_text_concatenates_all_three_parts() {
        let script = VideoScript::from_json(&valid_json()).unwrap();
        let text = script.narration_text();
        assert!(text.starts_with("This honey never spoiled."));
        assert!(text.ends_with("Would you taste it?"));
        assert!(text.contains("three millennia"));
    }
}
