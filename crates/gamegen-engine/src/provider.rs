use std::fmt;

use crate::errors::ProviderError;

/// Stable identifier for a completion provider (for example `deepseek`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProviderId(pub String);

impl ProviderId {
    /// Creates a provider id from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the provider id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One completion request: the fixed system instruction plus the templated
/// user message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Contract implemented by vendor integrations.
///
/// The call is modeled as a single request/response: the generation session
/// suspends here exactly once per request and never retries on its own.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Stable id used in error messages and logs.
    fn id(&self) -> ProviderId;

    /// Performs one completion call and returns the full response text.
    async fn complete(&self, req: CompletionRequest) -> Result<String, ProviderError>;
}
