use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static FILE_MARKER: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"<FILE:([^>]+)>\s*(.*?)\s*</FILE:[^>]+>")
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("file marker pattern is valid")
});

/// Splits raw model output into named files.
///
/// Scans for case-insensitive `<FILE:name>...</FILE:name>` pairs. Content is
/// matched non-greedily, so the first closing marker terminates the first
/// opening marker and markers do not nest. Captured names and content are
/// trimmed; later duplicates of a name overwrite earlier ones, and a name
/// that trims to nothing is discarded.
///
/// With no marker pairs at all, text carrying an HTML root signal (`<html`,
/// `<!doctype`, or `<div`, any case) becomes a single `index.html` holding
/// the whole trimmed text; anything else yields an empty map. Malformed
/// markers degrade to this fallback rather than failing.
pub fn extract_files(text: &str) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    for caps in FILE_MARKER.captures_iter(text) {
        let name = caps[1].trim();
        if name.is_empty() {
            continue;
        }
        files.insert(name.to_string(), caps[2].trim().to_string());
    }
    if files.is_empty() && looks_like_html(text) {
        files.insert("index.html".to_string(), text.trim().to_string());
    }
    files
}

fn looks_like_html(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("<html") || lower.contains("<!doctype") || lower.contains("<div")
}
