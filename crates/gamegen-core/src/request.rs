use serde::{Deserialize, Serialize};

/// Maximum accepted prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Malformed caller input, rejected before any provider call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Prompt is empty or whitespace-only.
    #[error("game description must not be blank")]
    BlankPrompt,
    /// Prompt exceeds `MAX_PROMPT_CHARS`.
    #[error("game description is too long ({len} chars, limit {MAX_PROMPT_CHARS})")]
    PromptTooLong { len: usize },
}

/// One game-generation request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free-text description of the desired game.
    pub prompt: String,
    /// Whether the caller wants incremental event delivery.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

impl GenerationRequest {
    /// Creates a streaming request for the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            stream: true,
        }
    }

    /// Checks prompt blankness and length.
    ///
    /// Runs before the provider is touched, so violations stay client errors
    /// rather than provider errors.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::BlankPrompt);
        }
        let len = self.prompt.chars().count();
        if len > MAX_PROMPT_CHARS {
            return Err(ValidationError::PromptTooLong { len });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_prompt_is_rejected() {
        let request = GenerationRequest::new("   \n\t ");
        assert_eq!(request.validate(), Err(ValidationError::BlankPrompt));
    }

    #[test]
    fn over_limit_prompt_is_rejected_with_length() {
        let request = GenerationRequest::new("x".repeat(MAX_PROMPT_CHARS + 1));
        let err = request.validate().expect_err("should reject");
        assert_eq!(err, ValidationError::PromptTooLong { len: 1001 });
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn prompt_at_limit_is_accepted() {
        let request = GenerationRequest::new("x".repeat(MAX_PROMPT_CHARS));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn stream_defaults_to_true_when_absent() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"prompt":"a pong clone"}"#).expect("valid request json");
        assert!(request.stream);
    }
}
