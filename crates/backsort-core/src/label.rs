//! Label extraction from rendered backlink entries.
//!
//! A rendered backlink is a small tree: a header row carrying the linking
//! note's title, followed by a region of match previews quoting the
//! linking note's body. Only the title is a usable label; text from the
//! previews must never be mistaken for it.

use serde::{Deserialize, Serialize};

/// What a node in a rendered entry represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The entry's own header row.
    PrimarySelf,
    /// The linking note's title element.
    FileTitle,
    /// Region of match previews / content snippets.
    MatchPreview,
    /// Anything else.
    #[default]
    Generic,
}

/// One node of a rendered backlink entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryNode {
    #[serde(default)]
    pub role: NodeRole,
    /// Text held directly by this node, excluding children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntryNode>,
}

impl EntryNode {
    #[must_use]
    pub fn new(role: NodeRole) -> Self {
        Self {
            role,
            text: None,
            children: Vec::new(),
        }
    }

    /// A childless node holding `text`.
    #[must_use]
    pub fn text(role: NodeRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: EntryNode) -> Self {
        self.children.push(child);
        self
    }

    /// All text in this subtree, in document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// First descendant (pre-order, self excluded) with the given role.
    fn find_descendant(&self, role: NodeRole) -> Option<&EntryNode> {
        self.children.iter().find_map(|child| {
            if child.role == role {
                Some(child)
            } else {
                child.find_descendant(role)
            }
        })
    }

    /// First descendant with non-blank own text outside any match preview.
    fn first_text_outside_previews(&self) -> Option<&str> {
        self.children.iter().find_map(|child| {
            if child.role == NodeRole::MatchPreview {
                return None;
            }
            child
                .text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .or_else(|| child.first_text_outside_previews())
        })
    }
}

/// Produces the label of a presented entry.
pub trait LabelExtractor<E: ?Sized> {
    /// Best-effort label; empty when nothing usable is found.
    fn extract(&self, entry: &E) -> String;
}

impl<E: ?Sized, F> LabelExtractor<E> for F
where
    F: Fn(&E) -> String,
{
    fn extract(&self, entry: &E) -> String {
        self(entry)
    }
}

/// Built-in extraction for [`EntryNode`] trees.
///
/// Tries, in order: the primary-self row, the file title, then the first
/// text outside the match previews. The first non-blank candidate wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeLabelExtractor;

impl LabelExtractor<EntryNode> for TreeLabelExtractor {
    fn extract(&self, entry: &EntryNode) -> String {
        extract_label(entry)
    }
}

/// Extract the label of a rendered entry. Never fails; returns an empty
/// string when no title can be found.
#[must_use]
pub fn extract_label(entry: &EntryNode) -> String {
    [NodeRole::PrimarySelf, NodeRole::FileTitle]
        .into_iter()
        .filter_map(|role| entry.find_descendant(role))
        .map(|node| node.text_content().trim().to_string())
        .find(|text| !text.is_empty())
        .or_else(|| entry.first_text_outside_previews().map(str::to_string))
        .unwrap_or_default()
}
