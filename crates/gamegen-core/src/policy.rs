use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of a single policy check, produced fresh per invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    /// Whether the checked content may be delivered.
    pub allowed: bool,
    /// Human-readable explanation of the verdict.
    pub reason: String,
}

impl PolicyVerdict {
    /// Creates a passing verdict.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    /// Creates a failing verdict.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Fatal whole-set policy failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("generated code failed the content policy: {reason}")]
pub struct PolicyRejection {
    pub reason: String,
}

/// Coarse file classification used by shipped guards to pick a rule list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// `.html` / `.htm`
    Html,
    /// `.js`
    Script,
    /// Anything else (stylesheets, assets).
    Other,
}

impl FileKind {
    /// Classifies a file by its name suffix.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".html") || lower.ends_with(".htm") {
            Self::Html
        } else if lower.ends_with(".js") {
            Self::Script
        } else {
            Self::Other
        }
    }
}

/// Pluggable judgment over generated content.
///
/// Implementations must be cheap and synchronous: the stream adapter calls
/// `check_file` once per streamed file and `check_file_set` once over the
/// complete decoded payload. Swapping in a real rule engine must not require
/// touching the adapter.
pub trait ContentPolicy: Send + Sync {
    /// Judges a single decoded file.
    fn check_file(&self, name: &str, content: &str) -> PolicyVerdict;

    /// Judges the complete decoded file set.
    fn check_file_set(&self, files: &BTreeMap<String, String>) -> PolicyVerdict;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_kind_classifies_by_suffix() {
        assert_eq!(FileKind::from_name("index.html"), FileKind::Html);
        assert_eq!(FileKind::from_name("GAME.HTM"), FileKind::Html);
        assert_eq!(FileKind::from_name("script.js"), FileKind::Script);
        assert_eq!(FileKind::from_name("style.css"), FileKind::Other);
        assert_eq!(FileKind::from_name("sprite.png"), FileKind::Other);
    }
}
