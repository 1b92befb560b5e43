use std::time::Duration;

use crate::errors::GenerationError;

/// Configuration for the DeepSeek provider client.
#[derive(Clone, Debug)]
pub struct DeepSeekClientConfig {
    /// API key used for bearer auth.
    pub api_key: String,
    /// Base URL for the OpenAI-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Model requested for completions.
    pub model: String,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
}

impl DeepSeekClientConfig {
    /// Creates a config with sensible defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `DEEPSEEK_API_KEY`, loading a `.env` file first
    /// when one is present.
    pub fn from_env() -> Result<Self, GenerationError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("DEEPSEEK_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(GenerationError::Config(
                "missing DEEPSEEK_API_KEY for DeepSeek provider".into(),
            ));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the requested model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
