//! Wikilink extraction from markdown bodies.
//!
//! Recognized forms:
//! - `[[Note]]`
//! - `[[Note|alias]]`
//! - `[[Note#Heading]]`, `[[Note#^block]]`
//! - `[[folder/Note]]`, `[[Note.md]]`
//!
//! Embeds (`![[Note]]`) count as links too.

use std::sync::LazyLock;

use regex::Regex;

static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|#^]+)(?:[#^][^\[\]|]*)?(?:\|[^\[\]]*)?\]\]")
        .expect("valid wikilink regex")
});

/// Link targets in `body`, in order of appearance, with heading/alias parts
/// and a trailing `.md` removed.
#[must_use]
pub fn extract_wikilinks(body: &str) -> Vec<String> {
    WIKILINK_RE
        .captures_iter(body)
        .map(|caps| normalize_target(&caps[1]))
        .filter(|target| !target.is_empty())
        .collect()
}

/// Trim whitespace and a trailing `.md` from a link target.
#[must_use]
pub fn normalize_target(target: &str) -> String {
    let target = target.trim();
    target.strip_suffix(".md").unwrap_or(target).trim().to_string()
}

/// Final path segment of a link target (`Projects/Alpha` → `Alpha`).
#[must_use]
pub fn note_name(target: &str) -> &str {
    target.rsplit('/').next().unwrap_or(target)
}

/// Whether a link target points at the note called `name`.
///
/// Targets resolve by final path segment, so `[[Projects/Alpha]]` and
/// `[[Alpha]]` both link to `Alpha`.
#[must_use]
pub fn links_to(target: &str, name: &str) -> bool {
    note_name(target) == note_name(name)
}
