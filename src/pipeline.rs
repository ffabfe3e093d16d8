use crate::credentials::CredentialStore;
use crate::error::Result;
use crate::script::VideoScript;
use crate::voice::VoiceName;
use crate::{logi, logok, logw};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the pipeline currently is. Advances strictly forward on
/// success; any stage failure lands in `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    Scripting,
    Voicing,
    Filming,
    Finished,
    Error,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Idle => "idle",
            Step::Scripting => "scripting",
            Step::Voicing => "voicing",
            Step::Filming => "filming",
            Step::Finished => "finished",
            Step::Error => "error",
        }
    }
}

/// Single source of truth for run progress. Replaced wholesale on
/// every transition, never mutated in place, so observers can never
/// see a torn update.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationState {
    pub step: Step,
    pub progress: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Start,
    ScriptReady,
    AudioReady,
    VideoReady,
    Failed(String),
    Reset,
}

impl GenerationState {
    pub fn idle() -> Self {
        Self {
            step: Step::Idle,
            progress: 0,
            message: String::new(),
        }
    }

    fn enter(step: Step, progress: u8, message: impl Into<String>) -> Self {
        Self {
            step,
            progress,
            message: message.into(),
        }
    }

    /// Pure transition function. Events that do not apply to the
    /// current step leave the state unchanged.
    pub fn advance(&self, event: &PipelineEvent) -> GenerationState {
        match (self.step, event) {
            (Step::Idle, PipelineEvent::Start) => {
                Self::enter(Step::Scripting, 10, "Weaving the mysterious story...")
            }
            (Step::Scripting, PipelineEvent::ScriptReady) => {
                Self::enter(Step::Voicing, 30, "Recording the shadowy narration...")
            }
            (Step::Voicing, PipelineEvent::AudioReady) => Self::enter(
                Step::Filming,
                60,
                "Filming the cinematic scenes (this can take 1-2 minutes)...",
            ),
            (Step::Filming, PipelineEvent::VideoReady) => {
                Self::enter(Step::Finished, 100, "Your masterpiece is ready!")
            }
            (Step::Scripting | Step::Voicing | Step::Filming, PipelineEvent::Failed(reason)) => {
                Self::enter(Step::Error, 0, format!("Error: {}", reason))
            }
            (Step::Finished | Step::Error, PipelineEvent::Reset) => Self::idle(),
            _ => self.clone(),
        }
    }
}

#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<VideoScript>;
}

#[async_trait]
pub trait NarrationSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<String>;
}

#[async_trait]
pub trait VideoSynthesizer: Send + Sync {
    /// Renders a clip for one visual prompt and returns the locally
    /// playable resource.
    async fn render(&self, prompt: &str) -> Result<PathBuf>;
}

pub type StateHook = Arc<dyn Fn(&GenerationState) + Send + Sync>;

/// Orchestrates the three sequential remote stages. One stage is in
/// flight at a time; callers must not start a second run before the
/// first leaves a non-idle step (the GUI disables its start button,
/// and `start_generation` refuses non-idle pipelines).
pub struct Pipeline {
    scripts: Arc<dyn ScriptGenerator>,
    narration: Arc<dyn NarrationSynthesizer>,
    video: Arc<dyn VideoSynthesizer>,
    credentials: Arc<dyn CredentialStore>,
    voice: VoiceName,
    state: GenerationState,
    state_hook: Option<StateHook>,
    script: Option<VideoScript>,
    audio_base64: Option<String>,
    video_path: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(
        scripts: Arc<dyn ScriptGenerator>,
        narration: Arc<dyn NarrationSynthesizer>,
        video: Arc<dyn VideoSynthesizer>,
        credentials: Arc<dyn CredentialStore>,
        voice: VoiceName,
    ) -> Self {
        Self {
            scripts,
            narration,
            video,
            credentials,
            voice,
            state: GenerationState::idle(),
            state_hook: None,
            script: None,
            audio_base64: None,
            video_path: None,
        }
    }

    pub fn set_state_hook(&mut self, hook: Option<StateHook>) {
        self.state_hook = hook;
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn script(&self) -> Option<&VideoScript> {
        self.script.as_ref()
    }

    pub fn audio_base64(&self) -> Option<&str> {
        self.audio_base64.as_deref()
    }

    pub fn video_path(&self) -> Option<&PathBuf> {
        self.video_path.as_ref()
    }

    /// Runs the full script -> narration -> video sequence for one
    /// topic. Every adapter error is converted into the error state
    /// here; stage artifacts produced before the failure are kept so
    /// the UI can still show them.
    pub async fn start_generation(&mut self, topic: &str) {
        if self.state.step != Step::Idle {
            logw(format!(
                "Ignoring start request while pipeline is {}",
                self.state.step.as_str()
            ));
            return;
        }

        if topic.trim().is_empty() {
            self.apply(PipelineEvent::Start);
            self.apply(PipelineEvent::Failed("topic must not be empty".to_string()));
            return;
        }

        if !self.credentials.has_configured_key() {
            self.apply(PipelineEvent::Start);
            self.apply(PipelineEvent::Failed("no API key configured".to_string()));
            return;
        }

        if let Err(err) = self.run_stages(topic).await {
            if err.is_credential_error() {
                logw("Provider rejected the configured API key; asking for re-selection.");
                self.credentials.prompt_key_selection();
            }
            self.apply(PipelineEvent::Failed(err.to_string()));
        }
    }

    async fn run_stages(&mut self, topic: &str) -> Result<()> {
        self.apply(PipelineEvent::Start);
        logi(format!("Generating script for topic: {}", topic));

        let script = self.scripts.generate(topic).await?;
        logok(format!("Script ready: {} ({} scenes)", script.title, script.scenes.len()));
        let narration_text = script.narration_text();
        // Only the first scene gets filmed; the rest of the generated
        // scene list stays on the script for the UI.
        let visual_prompt = script
            .scenes
            .first()
            .map(|s| s.visual_prompt.clone())
            .ok_or_else(|| crate::error::ShortsError::Schema("script has no scenes".to_string()))?;
        self.script = Some(script);
        self.apply(PipelineEvent::ScriptReady);

        let audio = self.narration.synthesize(&narration_text, self.voice).await?;
        logok(format!("Narration audio received ({} base64 chars)", audio.len()));
        self.audio_base64 = Some(audio);
        self.apply(PipelineEvent::AudioReady);

        let path = self.video.render(&visual_prompt).await?;
        logok(format!("Video resource ready: {}", path.display()));
        self.video_path = Some(path);
        self.apply(PipelineEvent::VideoReady);

        Ok(())
    }

    /// User-facing "create another" / "try again". Discards the run's
    /// artifacts and returns to idle. Does not cancel any in-flight
    /// remote operation; it only applies from finished or error.
    pub fn reset(&mut self) {
        if !matches!(self.state.step, Step::Finished | Step::Error) {
            return;
        }
        self.script = None;
        self.audio_base64 = None;
        self.video_path = None;
        self.apply(PipelineEvent::Reset);
    }

    fn apply(&mut self, event: PipelineEvent) {
        self.state = self.state.advance(&event);
        if let Some(hook) = &self.state_hook {
            hook(&self.state);
        }
    }
}

/// Wires the live Gemini and Veo adapters into a pipeline using the
/// loaded configuration.
pub fn build_pipeline(cfg: &crate::config::Config) -> anyhow::Result<Pipeline> {
    use anyhow::Context as _;

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(600))
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let voice: VoiceName = cfg.voice.parse().map_err(anyhow::Error::msg)?;
    let gemini = Arc::new(crate::api::gemini::GeminiClient::new(http.clone(), cfg));
    let veo = Arc::new(crate::api::veo::VeoClient::new(http, cfg));
    let credentials = Arc::new(crate::credentials::ConfigKeyStore::new(
        cfg.gemini_api_key.clone(),
    ));

    Ok(Pipeline::new(
        Arc::clone(&gemini) as Arc<dyn ScriptGenerator>,
        gemini,
        veo,
        credentials,
        voice,
    ))
}
