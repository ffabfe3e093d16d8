use thiserror::Error;

/// Failure taxonomy for the generation pipeline and its decoders.
///
/// Adapter errors are caught exactly once at the pipeline level, turned
/// into a user-facing message and an `error` state transition. Nothing
/// retries automatically.
#[derive(Error, Debug)]
pub enum ShortsError {
    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("audio format error: {0}")]
    Format(String),

    #[error("script schema error: {0}")]
    Schema(String),

    #[error("speech response contained no audio payload")]
    EmptyAudio,

    #[error("video operation completed without a retrievable asset")]
    AssetMissing,

    #[error("video generation still pending after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShortsError {
    /// Whether this failure means the configured API key is bad and the
    /// credential collaborator should re-prompt. The provider reports a
    /// revoked or non-billable key for the video models as an
    /// entity-not-found error rather than a 401.
    pub fn is_credential_error(&self) -> bool {
        match self {
            ShortsError::Provider(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("requested entity was not found")
                    || msg.contains("api key not valid")
                    || msg.contains("api_key_invalid")
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShortsError>;
