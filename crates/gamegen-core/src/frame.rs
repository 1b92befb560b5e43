use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::files::encode_content;
use crate::policy::{ContentPolicy, PolicyRejection};

/// One serialized event frame on the streaming interface.
///
/// A well-formed stream is `Start`, then any number of `Progress`/`File`/
/// `Warning` frames, then at most one of `Complete` or `Error` (never both),
/// then exactly one `End`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frame {
    /// First frame of every stream.
    Start { message: String },
    /// Status update with a content-length hint.
    Progress { message: String, length: usize },
    /// One delivered file; `content` is base64-encoded bytes.
    File { name: String, content: String },
    /// Non-terminal problem report (dropped file, decode fault).
    Warning { message: String },
    /// Terminal success.
    Complete {
        message: String,
        #[serde(rename = "fileCount")]
        file_count: usize,
    },
    /// Terminal failure; mutually exclusive with `Complete`.
    Error { message: String },
    /// Last frame of every stream, on every exit path.
    End,
}

impl Frame {
    /// Renders the frame for a `text/event-stream` transport: one JSON
    /// object behind a `data:` prefix, followed by a blank line.
    pub fn to_sse(&self) -> String {
        let json =
            serde_json::to_string(self).expect("frame serialization should be infallible");
        format!("data: {json}\n\n")
    }
}

/// Non-streaming delivery payload: every file base64-encoded plus a summary
/// message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBundle {
    /// File name to base64-encoded content.
    pub files: BTreeMap<String, String>,
    /// Human-readable completion message.
    pub message: String,
}

impl GameBundle {
    /// Builds the bundle from raw extracted files after a whole-set policy
    /// check; rejection is fatal for the request.
    pub fn from_files(
        files: &BTreeMap<String, String>,
        summary: impl Into<String>,
        policy: &dyn ContentPolicy,
    ) -> Result<Self, PolicyRejection> {
        let verdict = policy.check_file_set(files);
        if !verdict.allowed {
            warn!(reason = %verdict.reason, "generated file set rejected by content policy");
            return Err(PolicyRejection {
                reason: verdict.reason,
            });
        }
        let encoded = files
            .iter()
            .map(|(name, content)| (name.clone(), encode_content(content)))
            .collect();
        Ok(Self {
            files: encoded,
            message: summary.into(),
        })
    }
}
