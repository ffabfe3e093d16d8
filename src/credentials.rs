use crate::logw;

/// Boundary to whatever manages the provider API key. The pipeline
/// checks for a configured key before starting and asks for
/// re-selection when a run fails with a credential-class error.
pub trait CredentialStore: Send + Sync {
    fn has_configured_key(&self) -> bool;

    /// Asks the user to (re)select a key. Returns true if a usable key
    /// is available afterwards.
    fn prompt_key_selection(&self) -> bool;
}

/// Key management backed by config.json. There is no interactive
/// picker on the desktop, so prompting just tells the user where the
/// key lives.
pub struct ConfigKeyStore {
    api_key: String,
}

impl ConfigKeyStore {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }
}

impl CredentialStore for ConfigKeyStore {
    fn has_configured_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn prompt_key_selection(&self) -> bool {
        logw("The configured Gemini API key was rejected. Set gemini_api_key in config.json to a key from a billable project and restart.");
        false
    }
}
