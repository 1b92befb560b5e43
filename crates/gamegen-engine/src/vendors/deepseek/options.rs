use serde::{Deserialize, Serialize};

/// Per-request DeepSeek sampling options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeepSeekRequestOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token budget.
    pub max_tokens: u32,
}

impl Default for DeepSeekRequestOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

impl DeepSeekRequestOptions {
    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the completion token budget.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
