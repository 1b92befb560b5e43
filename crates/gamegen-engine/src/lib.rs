//! Generation engine for AI-built HTML5 games.
//!
//! Ties together the completion-provider contract, the DeepSeek vendor
//! adapter, prompt construction, the generation session (both delivery
//! modes), and the event-stream adapter that turns lifecycle events into
//! gated, deduplicated transport frames.
//!
//! # Streaming usage (DeepSeek)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gamegen_core::{GenerationRequest, PermissiveGuard};
//! use gamegen_engine::prelude::*;
//! use gamegen_engine::vendors::deepseek::DeepSeekProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), GenerationError> {
//! let session = GenerationSession::new(Arc::new(DeepSeekProvider::from_env()?));
//! let events = session.run_streaming(GenerationRequest::new("a tiny snake game"))?;
//!
//! let adapter = EventStreamAdapter::new(Arc::new(PermissiveGuard));
//! let mut frames = adapter.adapt(events);
//! while let Some(frame) = frames.next_frame().await {
//!     print!("{}", frame.to_sse());
//! }
//! # Ok(())
//! # }
//! ```

/// Event-stream adapter: policy gating, per-name dedup, transport framing.
pub mod adapter;
/// Public error types used by the engine API.
pub mod errors;
/// Common imports for typical usage.
pub mod prelude;
/// Prompt construction for the game-generation request.
pub mod prompt;
/// Completion-provider contract implemented by vendor integrations.
pub mod provider;
/// Generation session: the two entry points over one provider call.
pub mod session;
/// Vendor-specific integrations.
pub mod vendors;

pub use adapter::{EventStreamAdapter, FrameStream};
pub use errors::{GenerationError, ProviderError};
pub use prompt::{SYSTEM_PROMPT, build_game_prompt};
pub use provider::{CompletionProvider, CompletionRequest, ProviderId};
pub use session::{GenerationSession, GenerationStream, SessionOptions};
