//! YAML frontmatter parsing.
//!
//! Handles the `---` delimited YAML block at the top of a markdown note:
//! ```markdown
//! ---
//! created: 2025-10-02
//! edited: 2025-10-07
//! tags: [meeting]
//! ---
//!
//! # Meeting Notes
//! ```
//!
//! Only scalar values are kept; they are flattened to strings so the
//! resolver can match them against date shapes.

use crate::error::BacksortError;
use crate::metadata::Frontmatter;

/// Split a markdown file into frontmatter YAML and body content.
///
/// Returns `Ok(None)` when the file has no frontmatter at all, and
/// `Ok(Some((yaml, body)))` when it does.
///
/// # Errors
///
/// Returns [`BacksortError::Parse`] if the opening `---` is never closed.
pub fn split_frontmatter(content: &str) -> Result<Option<(&str, &str)>, BacksortError> {
    let content = content.trim_start_matches('\u{feff}');

    let Some(after_open) = content.strip_prefix("---") else {
        return Ok(None);
    };
    let Some(after_open) = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
    else {
        // "----" or "--- text" is a thematic break / text, not frontmatter
        return Ok(None);
    };

    // Empty block: closing delimiter on the very next line
    if let Some(rest) = after_open.strip_prefix("---") {
        return Ok(Some(("", skip_line_end(rest))));
    }

    let close_pos = after_open.find("\n---").ok_or_else(|| {
        BacksortError::Parse("No closing '---' frontmatter delimiter found".to_string())
    })?;

    let yaml = &after_open[..close_pos];
    let rest = &after_open[close_pos + 4..]; // skip \n---

    Ok(Some((yaml, skip_line_end(rest))))
}

fn skip_line_end(rest: &str) -> &str {
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n').unwrap_or(rest)
}

/// Parse the frontmatter of a markdown file into a flat string map.
///
/// Strings, numbers and booleans are kept; nulls, sequences and nested
/// mappings are dropped. Returns `Ok(None)` if the file has no frontmatter.
///
/// # Errors
///
/// Returns [`BacksortError::Parse`] if the block is unterminated, is not
/// valid YAML, or is not a mapping.
pub fn parse_frontmatter(content: &str) -> Result<Option<Frontmatter>, BacksortError> {
    let Some((yaml, _body)) = split_frontmatter(content)? else {
        return Ok(None);
    };

    if yaml.trim().is_empty() {
        return Ok(Some(Frontmatter::new()));
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| BacksortError::Parse(e.to_string()))?;

    let serde_yaml::Value::Mapping(mapping) = value else {
        return Err(BacksortError::Parse(
            "frontmatter must be a YAML mapping".to_string(),
        ));
    };

    let mut fields = Frontmatter::new();
    for (key, value) in mapping {
        let (Some(key), Some(value)) = (scalar_to_string(&key), scalar_to_string(&value)) else {
            continue;
        };
        fields.insert(key, value);
    }

    Ok(Some(fields))
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}
