//! Common imports for typical engine usage.
//!
//! This module intentionally exports the most frequently used session and
//! adapter types so application code needs fewer import lines.
pub use crate::{
    CompletionProvider, CompletionRequest, EventStreamAdapter, FrameStream, GenerationError,
    GenerationSession, GenerationStream, ProviderError, ProviderId, SessionOptions,
};
