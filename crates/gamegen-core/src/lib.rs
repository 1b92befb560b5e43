//! Core domain types for the AI game-generation pipeline.
//!
//! This crate is I/O-free: it owns the request/file/event data model, the
//! marker-based file extractor, the content-policy capability with its
//! shipped guards, and the transport frame types shared by both delivery
//! modes. Network and orchestration concerns live in `gamegen-engine`.

/// Lifecycle events produced by a generation session.
pub mod event;
/// Marker-based file extraction from raw model output.
pub mod extract;
/// Generated-file model and content encoding.
pub mod files;
/// Caller-facing transport shapes for both delivery modes.
pub mod frame;
/// Shipped `ContentPolicy` implementations.
pub mod guard;
/// Process-wide tracing initialization.
pub mod observability;
/// Content-policy capability and verdicts.
pub mod policy;
/// Caller request model and validation.
pub mod request;

pub use event::GenerationEvent;
pub use extract::extract_files;
pub use files::{ContentEncoding, FileDecodeError, GeneratedFile};
pub use frame::{Frame, GameBundle};
pub use guard::{PermissiveGuard, RuleGuard};
pub use observability::init_observability;
pub use policy::{ContentPolicy, FileKind, PolicyRejection, PolicyVerdict};
pub use request::{GenerationRequest, MAX_PROMPT_CHARS, ValidationError};
