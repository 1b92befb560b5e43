use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::policy::{ContentPolicy, FileKind, PolicyVerdict};

/// Policy that admits everything.
///
/// This is the default wiring; substitute `RuleGuard` or a custom
/// `ContentPolicy` to actually screen generated code.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveGuard;

impl ContentPolicy for PermissiveGuard {
    fn check_file(&self, _name: &str, _content: &str) -> PolicyVerdict {
        PolicyVerdict::allow("content checks disabled")
    }

    fn check_file_set(&self, _files: &BTreeMap<String, String>) -> PolicyVerdict {
        PolicyVerdict::allow("content checks disabled")
    }
}

// Script APIs that can execute arbitrary code or reach the network.
const DANGEROUS_API_PATTERNS: &[&str] = &[
    r"eval\s*\(",
    r"Function\s*\(",
    r"document\.write\s*\(",
    r"insertAdjacentHTML\s*\(",
    r"XMLHttpRequest\s*\(",
    r"fetch\s*\(",
    r"window\.open\s*\(",
    r"iframe\.src\s*=",
    r"script\.src\s*=",
    r"import\s*\(",
    r"require\s*\(",
];

// Markup that embeds executable or remote content.
const DANGEROUS_TAG_PATTERNS: &[&str] = &[
    r"<iframe[^>]*>",
    r"<object[^>]*>",
    r"<embed[^>]*>",
    r"<form[^>]*>",
    r"<link[^>]*>",
];

// javascript: URLs smuggled into attributes.
const DANGEROUS_EVENT_PATTERNS: &[&str] = &[r"javascript:"];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("guard pattern is valid"))
        .collect()
}

static DANGEROUS_APIS: Lazy<Vec<Regex>> = Lazy::new(|| compile(DANGEROUS_API_PATTERNS));
static DANGEROUS_TAGS: Lazy<Vec<Regex>> = Lazy::new(|| compile(DANGEROUS_TAG_PATTERNS));
static DANGEROUS_EVENTS: Lazy<Vec<Regex>> = Lazy::new(|| compile(DANGEROUS_EVENT_PATTERNS));

/// Rule-list policy screening generated code for script-injection and
/// network-reach primitives.
///
/// HTML-like files are screened for dangerous tags and inline `javascript:`
/// URLs, script-like files for dangerous APIs; other file kinds pass. The
/// whole-set check applies the per-file rules to every entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleGuard;

impl RuleGuard {
    fn first_hit(rules: &[Regex], content: &str) -> Option<String> {
        rules
            .iter()
            .find(|rule| rule.is_match(content))
            .map(|rule| rule.as_str().to_string())
    }
}

impl ContentPolicy for RuleGuard {
    fn check_file(&self, name: &str, content: &str) -> PolicyVerdict {
        match FileKind::from_name(name) {
            FileKind::Html => {
                if let Some(pattern) = Self::first_hit(&DANGEROUS_TAGS, content) {
                    return PolicyVerdict::deny(format!("dangerous markup matched `{pattern}`"));
                }
                if let Some(pattern) = Self::first_hit(&DANGEROUS_EVENTS, content) {
                    return PolicyVerdict::deny(format!("dangerous handler matched `{pattern}`"));
                }
                PolicyVerdict::allow("no dangerous markup found")
            }
            FileKind::Script => match Self::first_hit(&DANGEROUS_APIS, content) {
                Some(pattern) => {
                    PolicyVerdict::deny(format!("dangerous API call matched `{pattern}`"))
                }
                None => PolicyVerdict::allow("no dangerous API calls found"),
            },
            FileKind::Other => PolicyVerdict::allow("file kind is not screened"),
        }
    }

    fn check_file_set(&self, files: &BTreeMap<String, String>) -> PolicyVerdict {
        for (name, content) in files {
            let verdict = self.check_file(name, content);
            if !verdict.allowed {
                return PolicyVerdict::deny(format!("{name}: {}", verdict.reason));
            }
        }
        PolicyVerdict::allow("all files passed")
    }
}
