use gamegen_core::{PolicyRejection, ValidationError};

use crate::provider::ProviderId;

/// Errors returned by a completion provider before they are surfaced as a
/// terminal failure event or a `GenerationError`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Provider returned an application-level failure (HTTP status, auth,
    /// quota, malformed request).
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: ProviderId,
        message: String,
        status_code: Option<u16>,
    },
    /// Transport or request I/O failed.
    #[error("transport error ({provider}): {message}")]
    Transport {
        provider: ProviderId,
        message: String,
    },
    /// Provider response shape was invalid.
    #[error("protocol error ({provider}): {message}")]
    Protocol {
        provider: ProviderId,
        message: String,
    },
}

impl ProviderError {
    /// Creates a provider-level error.
    pub fn provider(
        provider: impl Into<ProviderId>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns the provider associated with this error.
    pub fn provider_id(&self) -> &ProviderId {
        match self {
            Self::Provider { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Protocol { provider, .. } => provider,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Provider { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. } => message,
        }
    }
}

/// Top-level error type for the generation API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Invalid provider/client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Malformed caller input, rejected before any provider call.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Completion call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Provider succeeded but returned nothing usable.
    #[error("model returned no usable content")]
    EmptyCompletion,
    /// The generated file set was rejected by the content policy.
    #[error(transparent)]
    Policy(#[from] PolicyRejection),
}
