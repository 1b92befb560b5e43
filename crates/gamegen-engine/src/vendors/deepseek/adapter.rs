use tracing::debug;

use crate::errors::{GenerationError, ProviderError};
use crate::provider::{CompletionProvider, CompletionRequest, ProviderId};

use super::config::DeepSeekClientConfig;
use super::options::DeepSeekRequestOptions;

const DEEPSEEK_PROVIDER: &str = "deepseek";

/// Provider adapter for DeepSeek's OpenAI-compatible chat-completions API.
///
/// Issues one non-streamed completion per request; retry decisions belong to
/// the caller.
#[derive(Debug)]
pub struct DeepSeekProvider {
    client: reqwest::Client,
    config: DeepSeekClientConfig,
    options: DeepSeekRequestOptions,
}

impl DeepSeekProvider {
    /// Creates a provider from explicit client configuration.
    pub fn new(config: DeepSeekClientConfig) -> Result<Self, GenerationError> {
        Self::with_options(config, DeepSeekRequestOptions::default())
    }

    /// Creates a provider with explicit sampling options.
    pub fn with_options(
        config: DeepSeekClientConfig,
        options: DeepSeekRequestOptions,
    ) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::Config(
                "DeepSeek client config api_key must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to build DeepSeek client: {e}")))?;
        Ok(Self {
            client,
            config,
            options,
        })
    }

    /// Creates a provider using `DEEPSEEK_API_KEY`.
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(DeepSeekClientConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for DeepSeekProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(DEEPSEEK_PROVIDER)
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, ProviderError> {
        let provider_id = ProviderId::new(DEEPSEEK_PROVIDER);
        let body = build_request_body(&self.config.model, &self.options, &req);
        debug!(model = %self.config.model, "requesting DeepSeek chat completion");

        let response = self
            .client
            .post(self.config.chat_completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::transport(
                    provider_id.clone(),
                    format!("DeepSeek request failed: {e}"),
                )
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ProviderError::transport(
                provider_id.clone(),
                format!("DeepSeek response read failed: {e}"),
            )
        })?;
        if !status.is_success() {
            return Err(ProviderError::provider(
                provider_id,
                format!("DeepSeek chat completion failed with status {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            ProviderError::protocol(
                provider_id.clone(),
                format!("invalid DeepSeek response JSON: {e}"),
            )
        })?;
        extract_message_content(&value).ok_or_else(|| {
            ProviderError::protocol(
                provider_id,
                "DeepSeek response did not include message content",
            )
        })
    }
}

pub(crate) fn build_request_body(
    model: &str,
    options: &DeepSeekRequestOptions,
    req: &CompletionRequest,
) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": req.system_prompt },
            { "role": "user", "content": req.user_prompt },
        ],
        "stream": false,
        "temperature": options.temperature,
        "max_tokens": options.max_tokens,
    })
}

pub(crate) fn extract_message_content(value: &serde_json::Value) -> Option<String> {
    value
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|v| v.as_str())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "sys".into(),
            user_prompt: "make pong".into(),
        }
    }

    #[test]
    fn request_body_is_a_non_streamed_chat_completion() {
        let body = build_request_body("deepseek-chat", &DeepSeekRequestOptions::default(), &request());
        assert_eq!(body.get("stream").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            body.get("model").and_then(|v| v.as_str()),
            Some("deepseek-chat")
        );
        assert_eq!(
            body.get("max_tokens").and_then(|v| v.as_u64()),
            Some(4000)
        );
        let messages = body.get("messages").and_then(|v| v.as_array()).expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0].get("role").and_then(|v| v.as_str()),
            Some("system")
        );
        assert_eq!(
            messages[1].get("content").and_then(|v| v.as_str()),
            Some("make pong")
        );
    }

    #[test]
    fn sampling_options_are_applied_to_the_body() {
        let options = DeepSeekRequestOptions::default()
            .temperature(0.2)
            .max_tokens(512);
        let body = build_request_body("deepseek-chat", &options, &request());
        assert_eq!(body.get("max_tokens").and_then(|v| v.as_u64()), Some(512));
    }

    #[test]
    fn message_content_is_read_from_the_first_choice() {
        let value = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "<html>hi</html>" } }
            ]
        });
        assert_eq!(
            extract_message_content(&value).as_deref(),
            Some("<html>hi</html>")
        );
    }

    #[test]
    fn missing_content_yields_none() {
        assert_eq!(extract_message_content(&serde_json::json!({})), None);
        let no_choices = serde_json::json!({ "choices": [] });
        assert_eq!(extract_message_content(&no_choices), None);
    }

    #[test]
    fn blank_api_key_is_a_config_error() {
        let err = DeepSeekProvider::new(DeepSeekClientConfig::new("  ")).expect_err("reject");
        assert!(matches!(err, GenerationError::Config(message) if message.contains("api_key")));
    }
}
